//! Daemon runtime: wires configuration, telemetry, the built-in command
//! set, and the console server, then waits for a shutdown signal.

use std::io;
use std::sync::Arc;
use std::time::Instant;

use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use thiserror::Error;
use tracing::info;

use conch_config::ConsoleConfig;
use conch_core::{DefineError, Dispatcher};

use crate::builtin;
use crate::server::{ConsoleServer, QueryHandler, ServerError, TracingObserver};
use crate::telemetry::{self, TelemetryError};

const RUNTIME_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::runtime");

/// Errors surfaced while launching or supervising the daemon.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        #[from]
        source: TelemetryError,
    },
    /// Registering the built-in command set failed.
    #[error("failed to register built-in commands: {source}")]
    Define {
        #[from]
        source: DefineError,
    },
    /// The console server failed to start or stop.
    #[error("console server failure: {source}")]
    Server {
        #[from]
        source: ServerError,
    },
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Signals {
        #[source]
        source: io::Error,
    },
}

/// Abstraction over shutdown notification mechanisms.
pub trait ShutdownSignal {
    /// Blocks until shutdown should proceed.
    fn wait(&self) -> Result<(), LaunchError>;
}

/// Shutdown listener that waits for termination signals.
#[derive(Debug, Default)]
pub struct SystemShutdownSignal;

impl ShutdownSignal for SystemShutdownSignal {
    fn wait(&self) -> Result<(), LaunchError> {
        let mut signals =
            Signals::new([SIGINT, SIGTERM]).map_err(|source| LaunchError::Signals { source })?;
        if let Some(signal) = signals.forever().next() {
            info!(target: RUNTIME_TARGET, signal, "shutdown signal received");
        }
        Ok(())
    }
}

/// Runs the daemon until a termination signal arrives.
pub fn run(config: &ConsoleConfig) -> Result<(), LaunchError> {
    run_with(config, &SystemShutdownSignal)
}

pub(crate) fn run_with<S: ShutdownSignal>(
    config: &ConsoleConfig,
    shutdown: &S,
) -> Result<(), LaunchError> {
    telemetry::initialise(config)?;

    let mut dispatcher = Dispatcher::new();
    builtin::register(&mut dispatcher, Instant::now())?;

    let handler = QueryHandler::new(Arc::new(dispatcher), Arc::new(TracingObserver));
    let mut server = ConsoleServer::start(&config.endpoint, handler)?;
    info!(
        target: RUNTIME_TARGET,
        endpoint = %config.endpoint,
        "console ready"
    );

    shutdown.wait()?;
    server.stop()?;
    Ok(())
}
