//! Observation hooks for console server activity.
//!
//! The server reports received commands, unparsable lines, and socket
//! faults through a [`ConsoleObserver`] so embedding processes can audit
//! remote activity. The default [`TracingObserver`] forwards everything to
//! structured logs.

use std::io;
use std::net::SocketAddr;

use tracing::{info, warn};

use super::SERVER_TARGET;

/// Receives notifications about console server activity.
///
/// All hooks default to no-ops so implementors can observe only what they
/// care about. Hooks run on connection threads and should return quickly.
pub trait ConsoleObserver: Send + Sync + 'static {
    /// A well-formed request line was received and will be dispatched.
    fn command_received(&self, _peer: Option<SocketAddr>, _raw: &str) {}

    /// A line arrived that could not be parsed as a request. No reply is
    /// sent for such lines.
    fn invalid_command(&self, _peer: Option<SocketAddr>, _raw: &str) {}

    /// A socket-level fault other than a peer reset occurred.
    fn socket_error(&self, _peer: Option<SocketAddr>, _error: &io::Error) {}
}

/// Observer that forwards all activity to `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl ConsoleObserver for TracingObserver {
    fn command_received(&self, peer: Option<SocketAddr>, raw: &str) {
        info!(target: SERVER_TARGET, ?peer, raw, "command received");
    }

    fn invalid_command(&self, peer: Option<SocketAddr>, raw: &str) {
        warn!(target: SERVER_TARGET, ?peer, raw, "invalid command received");
    }

    fn socket_error(&self, peer: Option<SocketAddr>, error: &io::Error) {
        warn!(target: SERVER_TARGET, ?peer, %error, "socket error");
    }
}
