//! Rendering of reply frames for terminal output.

use serde_json::Value;
use serde_json::ser::PrettyFormatter;

/// A reply ready for printing.
#[derive(Debug, PartialEq, Eq)]
pub struct Reply {
    /// The rendered text, newline-terminated.
    pub text: String,
    /// Whether the console reported an error rather than a result array.
    pub is_error: bool,
}

/// Renders one reply frame.
///
/// The frame's payload line is parsed as JSON. Successful replies are
/// arrays: each element prints as its own four-space-indented block,
/// strings verbatim and other values pretty-printed. Any non-array
/// payload is the console's error value, rendered the same way. An
/// unparsable payload prints as raw text.
pub fn reply(frame: &str) -> Reply {
    let mut parts = frame.splitn(2, '\n');
    let _header = parts.next();
    let body = parts.next().unwrap_or_default().trim_end_matches('\n');

    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return Reply {
            text: render_text(body),
            is_error: true,
        };
    };

    match value {
        Value::Array(items) => Reply {
            text: items.iter().map(render_item).collect(),
            is_error: false,
        },
        other => Reply {
            text: render_item(&other),
            is_error: true,
        },
    }
}

fn render_item(value: &Value) -> String {
    match value {
        Value::String(text) => render_text(text),
        other => format!("{}\n", indent(&pretty(other))),
    }
}

fn render_text(text: &str) -> String {
    format!("{}\n\n", indent(text))
}

fn pretty(value: &Value) -> String {
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut output = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut output, formatter);
    match serde::Serialize::serialize(value, &mut serializer) {
        Ok(()) => String::from_utf8_lossy(&output).into_owned(),
        Err(_) => value.to_string(),
    }
}

fn indent(text: &str) -> String {
    text.split('\n')
        .map(|line| format!("    {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
