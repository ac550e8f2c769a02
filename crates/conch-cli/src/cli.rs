//! Command-line arguments for the console client.

use clap::Parser;

use conch_config::SocketEndpoint;

/// Sends one query to a running console daemon and prints the reply.
#[derive(Debug, Parser)]
#[command(name = "conch", about = "Remote command console client")]
pub struct ConsoleArgs {
    /// Endpoint of the console daemon.
    #[arg(
        long,
        env = "CONCH_ENDPOINT",
        default_value = "tcp://127.0.0.1:2020",
        value_name = "URL"
    )]
    pub endpoint: SocketEndpoint,

    /// The query tokens, e.g. `sys echo hello -repeat 2`.
    #[arg(
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "QUERY"
    )]
    pub query: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_trailing_tokens_including_hyphen_values() {
        let args =
            ConsoleArgs::try_parse_from(["conch", "sys", "echo", "hi", "-repeat", "2", "--upper"])
                .expect("parse");
        assert_eq!(args.query, ["sys", "echo", "hi", "-repeat", "2", "--upper"]);
    }

    #[test]
    fn endpoint_flag_precedes_the_query() {
        let args =
            ConsoleArgs::try_parse_from(["conch", "--endpoint", "tcp://10.0.0.1:9000", "sys", "ping"])
                .expect("parse");
        assert_eq!(args.endpoint, SocketEndpoint::new("10.0.0.1", 9000));
        assert_eq!(args.query, ["sys", "ping"]);
    }

    #[test]
    fn query_is_required() {
        assert!(ConsoleArgs::try_parse_from(["conch"]).is_err());
    }
}
