//! Request parsing and response framing for the console wire protocol.
//!
//! Requests are newline-delimited JSON lines:
//!
//! ```json
//! {"id":1,"query":"sys ping"}
//! ```
//!
//! where `query` is a space-delimited string or a token array. A reply is
//! one frame: a header line echoing the request id, one JSON payload line,
//! and a blank terminator line:
//!
//! ```text
//! 1:
//! ["pong"]
//!
//! ```
//!
//! On success the payload is the handler's reply array (a one-element
//! array holding the help text for help queries); on failure it is the
//! error value in the same frame position: a string for binding and
//! resolution errors, a structured object for handler faults.

use std::io::{self, Write};

use serde::Deserialize;
use serde_json::{Value, json};

use conch_core::{ArgMap, CommandError, Dispatcher, Query};

/// A parsed request line.
#[derive(Debug, Deserialize)]
pub(crate) struct ConsoleRequest {
    /// Caller-supplied correlation id, echoed in the reply header.
    #[serde(default)]
    pub id: i64,
    /// The raw query value, validated by [`evaluate`].
    #[serde(default)]
    pub query: Value,
}

impl ConsoleRequest {
    /// Parses a request line. Returns `None` when the line is not valid
    /// JSON matching the request schema; such lines get no reply.
    pub fn parse(line: &str) -> Option<Self> {
        serde_json::from_str(line).ok()
    }
}

/// Resolves and runs one request query against the dispatcher, producing
/// the reply payload: `Ok` carries the result array, `Err` the error value.
pub(crate) fn evaluate(dispatcher: &Dispatcher, query: &Value) -> Result<Vec<Value>, Value> {
    let query = classify(query)?;

    let parsed = dispatcher
        .parse_query(query)
        .map_err(|error| Value::from(error.to_string()))?;

    let Some(parsed) = parsed else {
        return Err(Value::from(
            CommandError::command_not_found("").to_string(),
        ));
    };

    if parsed.is_help {
        return Ok(vec![Value::from(dispatcher.help(&parsed.path))]);
    }

    run(dispatcher, &parsed.path, &parsed.args)
}

/// Validates the raw query value: a string or an array of strings.
fn classify(query: &Value) -> Result<Query, Value> {
    match query {
        Value::String(line) => Ok(Query::from(line.as_str())),
        Value::Array(items) => {
            let tokens: Option<Vec<String>> = items
                .iter()
                .map(|item| item.as_str().map(ToOwned::to_owned))
                .collect();
            tokens
                .map(Query::from)
                .ok_or_else(invalid_message_format)
        }
        _ => Err(invalid_message_format()),
    }
}

fn run(dispatcher: &Dispatcher, path: &str, args: &ArgMap) -> Result<Vec<Value>, Value> {
    match dispatcher.execute(path, args) {
        Ok(result) => result,
        Err(CommandError::HandlerException {
            path,
            message,
            args,
        }) => Err(json!({
            "msg": "Exception while executing CLI command",
            "path": path,
            "args": args,
            "error": message,
        })),
        Err(error) => Err(Value::from(error.to_string())),
    }
}

fn invalid_message_format() -> Value {
    Value::from(CommandError::InvalidMessageFormat.to_string())
}

/// Writes one reply frame: the echoed id header, the JSON payload line,
/// and the blank terminator.
pub(crate) fn write_frame<W: Write>(
    writer: &mut W,
    id: i64,
    payload: &Result<Vec<Value>, Value>,
) -> io::Result<()> {
    let body = match payload {
        Ok(values) => serde_json::to_string(values),
        Err(error) => serde_json::to_string(error),
    }
    .map_err(io::Error::other)?;
    write!(writer, "{id}:\n{body}\n\n")?;
    writer.flush()
}
