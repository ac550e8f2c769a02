//! Shared configuration for the conch console daemon and client.
//!
//! Configuration is sourced from command-line flags with `CONCH_*`
//! environment-variable fallback. Both binaries share the
//! [`SocketEndpoint`] notation (`tcp://host:port`) so an endpoint printed
//! by one can be pasted into the other.

mod endpoint;

use clap::{Parser, ValueEnum};

pub use endpoint::{EndpointParseError, SocketEndpoint};

/// Output format for structured logs.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum LogFormat {
    /// Compact single-line human-readable output.
    #[default]
    Compact,
    /// One JSON object per log event.
    Json,
}

/// Runtime configuration for the console daemon.
#[derive(Debug, Clone, Parser)]
#[command(name = "conchd", about = "Remote command console daemon")]
pub struct ConsoleConfig {
    /// Endpoint the console listens on.
    #[arg(
        long,
        env = "CONCH_ENDPOINT",
        default_value = "tcp://127.0.0.1:2020",
        value_name = "URL"
    )]
    pub endpoint: SocketEndpoint,

    /// Tracing filter expression (e.g. `info`, `conchd=debug`).
    #[arg(long, env = "CONCH_LOG_FILTER", default_value = "info")]
    pub log_filter: String,

    /// Structured log output format.
    #[arg(long, env = "CONCH_LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            endpoint: SocketEndpoint::new("127.0.0.1", 2020),
            log_filter: String::from("info"),
            log_format: LogFormat::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_flag_free_invocation() {
        let config = ConsoleConfig::try_parse_from(["conchd"]).expect("parse");
        assert_eq!(config.endpoint, SocketEndpoint::new("127.0.0.1", 2020));
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.log_format, LogFormat::Compact);
    }

    #[test]
    fn endpoint_flag_overrides_default() {
        let config =
            ConsoleConfig::try_parse_from(["conchd", "--endpoint", "tcp://0.0.0.0:9000"])
                .expect("parse");
        assert_eq!(config.endpoint, SocketEndpoint::new("0.0.0.0", 9000));
    }

    #[test]
    fn invalid_endpoint_is_a_usage_error() {
        let result = ConsoleConfig::try_parse_from(["conchd", "--endpoint", "nonsense"]);
        assert!(result.is_err());
    }
}
