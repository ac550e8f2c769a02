//! Remote command console daemon.
//!
//! `conchd` exposes an application's [`conch_core::Dispatcher`] over a TCP
//! console: newline-delimited JSON request lines in, framed JSON replies
//! out. The crate wires together configuration from [`conch_config`],
//! structured telemetry, a built-in `sys.*` diagnostic command set, and
//! the listener in [`server`].

mod builtin;
mod runtime;
pub mod server;
pub mod telemetry;

pub use builtin::register as register_builtin_commands;
pub use runtime::{LaunchError, ShutdownSignal, SystemShutdownSignal, run};
pub use server::{
    ConnectionHandler, ConsoleObserver, ConsoleServer, QueryHandler, ServerError, ServerHandle,
    TracingObserver,
};
pub use telemetry::{TelemetryError, TelemetryHandle};
