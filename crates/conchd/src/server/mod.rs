//! Console server: TCP listener, per-connection request loop, and wire
//! protocol framing.

mod connection;
mod errors;
mod listener;
mod observer;
mod protocol;

pub(crate) const SERVER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::server");

pub use connection::{ConnectionHandler, QueryHandler};
pub use errors::ServerError;
pub use listener::{ConsoleServer, ServerHandle};
pub use observer::{ConsoleObserver, TracingObserver};
