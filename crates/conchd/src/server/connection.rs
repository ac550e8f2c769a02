//! Per-connection request loop for the console server.
//!
//! Each accepted socket gets one handler invocation on its own thread.
//! Lines are read in arrival order and answered in the same order, so a
//! caller that pipelines requests on one connection observes replies in
//! request order. Execution is synchronous within the connection: a slow
//! handler delays only that connection's replies.

use std::io::{self, BufRead, BufReader};
use std::net::TcpStream;
use std::sync::Arc;

use tracing::debug;

use conch_core::Dispatcher;

use super::SERVER_TARGET;
use super::observer::ConsoleObserver;
use super::protocol::{self, ConsoleRequest};

/// Handles accepted console connections.
pub trait ConnectionHandler: Send + Sync + 'static {
    /// Handles a single connection. Implementations should avoid
    /// panicking.
    fn handle(&self, stream: TcpStream);
}

/// Connection handler that parses request lines and dispatches queries.
pub struct QueryHandler {
    dispatcher: Arc<Dispatcher>,
    observer: Arc<dyn ConsoleObserver>,
}

impl QueryHandler {
    /// Creates a handler over a dispatcher and observer.
    pub fn new(dispatcher: Arc<Dispatcher>, observer: Arc<dyn ConsoleObserver>) -> Self {
        Self {
            dispatcher,
            observer,
        }
    }

    fn serve(&self, stream: TcpStream) -> io::Result<()> {
        let peer = stream.peer_addr().ok();
        let mut writer = stream.try_clone()?;
        let mut reader = BufReader::new(stream);
        let mut line = String::new();

        loop {
            line.clear();
            match reader.read_line(&mut line) {
                Ok(0) => return Ok(()),
                Ok(_) => {}
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(error),
            }

            let trimmed = line.trim_end_matches(['\n', '\r']);
            if trimmed.is_empty() {
                continue;
            }

            let Some(request) = ConsoleRequest::parse(trimmed) else {
                self.observer.invalid_command(peer, trimmed);
                continue;
            };
            self.observer.command_received(peer, trimmed);

            let payload = protocol::evaluate(&self.dispatcher, &request.query);
            protocol::write_frame(&mut writer, request.id, &payload)?;
        }
    }
}

impl ConnectionHandler for QueryHandler {
    fn handle(&self, stream: TcpStream) {
        let peer = stream.peer_addr().ok();
        match self.serve(stream) {
            Ok(()) => {
                debug!(target: SERVER_TARGET, ?peer, "connection closed");
            }
            // A peer that resets mid-conversation is routine and is not
            // reported.
            Err(error) if error.kind() == io::ErrorKind::ConnectionReset => {}
            Err(error) => self.observer.socket_error(peer, &error),
        }
    }
}
