//! User-facing error type for the console client.

use std::io;

use thiserror::Error;

/// Errors surfaced to the user by the `conch` binary.
#[derive(Debug, Error)]
pub enum AppError {
    /// The endpoint host did not resolve to a TCP address.
    #[error("failed to resolve console endpoint {endpoint}: {source}")]
    Resolve {
        endpoint: String,
        #[source]
        source: io::Error,
    },
    /// Connecting to the console timed out or was refused.
    #[error("failed to connect to console at {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: io::Error,
    },
    /// The connection failed mid-exchange.
    #[error("console connection failed: {source}")]
    Io {
        #[source]
        source: io::Error,
    },
    /// The console closed the connection without sending a reply frame.
    #[error("console closed the connection without replying")]
    EmptyReply,
}

impl AppError {
    pub(crate) fn resolve(endpoint: impl Into<String>, source: io::Error) -> Self {
        Self::Resolve {
            endpoint: endpoint.into(),
            source,
        }
    }

    pub(crate) fn connect(endpoint: impl Into<String>, source: io::Error) -> Self {
        Self::Connect {
            endpoint: endpoint.into(),
            source,
        }
    }

    pub(crate) fn io(source: io::Error) -> Self {
        Self::Io { source }
    }
}
