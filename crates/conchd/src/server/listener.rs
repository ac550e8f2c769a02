//! TCP listener for the console server.
//!
//! The listener accepts connections on a background thread and hands each
//! accepted socket to a [`ConnectionHandler`] on its own thread. The
//! accept loop polls a non-blocking socket so shutdown requests are
//! noticed promptly; [`ServerHandle::stop`] also force-closes any
//! connections still serving a peer.

use std::collections::HashMap;
use std::io;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use conch_config::SocketEndpoint;

use super::SERVER_TARGET;
use super::connection::ConnectionHandler;
use super::errors::ServerError;

/// Pause between accept polls when no connection is pending.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(25);
/// Pause after an accept error before retrying.
const ERROR_BACKOFF: Duration = Duration::from_millis(150);

/// Live connections, keyed by an id private to the table.
///
/// Each entry holds a clone of the connection's stream so the server can
/// force-close peers that are still connected when it stops.
#[derive(Default)]
struct ConnectionTable {
    next_id: AtomicU64,
    live: Mutex<HashMap<u64, TcpStream>>,
}

impl ConnectionTable {
    fn insert(&self, stream: &TcpStream) -> io::Result<u64> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let clone = stream.try_clone()?;
        self.live.lock().expect("connection table lock").insert(id, clone);
        Ok(id)
    }

    fn remove(&self, id: u64) {
        self.live.lock().expect("connection table lock").remove(&id);
    }

    fn close_all(&self) {
        let mut live = self.live.lock().expect("connection table lock");
        for stream in live.values() {
            let _ = stream.shutdown(Shutdown::Both);
        }
        live.clear();
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.live.lock().expect("connection table lock").len()
    }
}

/// Console server bound to a TCP endpoint.
pub struct ConsoleServer;

impl ConsoleServer {
    /// Binds the endpoint and starts accepting connections.
    pub fn start<H: ConnectionHandler>(
        endpoint: &SocketEndpoint,
        handler: H,
    ) -> Result<ServerHandle, ServerError> {
        let addr = resolve(endpoint)?;
        let listener = TcpListener::bind(addr).map_err(|source| ServerError::Bind {
            addr,
            source,
        })?;
        listener
            .set_nonblocking(true)
            .map_err(|source| ServerError::NonBlocking { source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ServerError::NonBlocking { source })?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let connections = Arc::new(ConnectionTable::default());
        let handler = Arc::new(handler);
        let thread = {
            let shutdown = Arc::clone(&shutdown);
            let connections = Arc::clone(&connections);
            thread::spawn(move || accept_loop(&listener, &handler, &shutdown, &connections))
        };

        info!(target: SERVER_TARGET, %local_addr, "console server listening");
        Ok(ServerHandle {
            shutdown,
            connections,
            local_addr,
            thread: Some(thread),
        })
    }
}

fn resolve(endpoint: &SocketEndpoint) -> Result<SocketAddr, ServerError> {
    let mut addrs = (endpoint.host(), endpoint.port())
        .to_socket_addrs()
        .map_err(|source| ServerError::Resolve {
            host: endpoint.host().to_owned(),
            port: endpoint.port(),
            source,
        })?;
    addrs.next().ok_or_else(|| ServerError::ResolveEmpty {
        host: endpoint.host().to_owned(),
        port: endpoint.port(),
    })
}

fn accept_loop<H: ConnectionHandler>(
    listener: &TcpListener,
    handler: &Arc<H>,
    shutdown: &AtomicBool,
    connections: &Arc<ConnectionTable>,
) {
    while !shutdown.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, peer)) => {
                debug!(target: SERVER_TARGET, %peer, "connection accepted");
                spawn_connection(stream, Arc::clone(handler), Arc::clone(connections));
            }
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_BACKOFF);
            }
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error) => {
                warn!(target: SERVER_TARGET, %error, "accept failed");
                thread::sleep(ERROR_BACKOFF);
            }
        }
    }
    debug!(target: SERVER_TARGET, "accept loop stopped");
}

fn spawn_connection<H: ConnectionHandler>(
    stream: TcpStream,
    handler: Arc<H>,
    connections: Arc<ConnectionTable>,
) {
    let id = match connections.insert(&stream) {
        Ok(id) => id,
        Err(error) => {
            warn!(target: SERVER_TARGET, %error, "failed to register connection");
            return;
        }
    };
    thread::spawn(move || {
        handler.handle(stream);
        connections.remove(id);
    });
}

/// Handle over a running console server.
pub struct ServerHandle {
    shutdown: Arc<AtomicBool>,
    connections: Arc<ConnectionTable>,
    local_addr: SocketAddr,
    thread: Option<JoinHandle<()>>,
}

impl ServerHandle {
    /// The address the listener is bound to. Useful when binding port 0.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting, force-closes live connections, and joins the
    /// accept thread.
    pub fn stop(&mut self) -> Result<(), ServerError> {
        self.shutdown.store(true, Ordering::SeqCst);
        self.connections.close_all();
        if let Some(thread) = self.thread.take() {
            thread.join().map_err(|_| ServerError::ThreadPanic)?;
        }
        info!(target: SERVER_TARGET, "console server stopped");
        Ok(())
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if self.thread.is_some() {
            let _ = self.stop();
        }
    }
}
