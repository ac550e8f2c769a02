//! Error types for command resolution, binding, and execution.
//!
//! Every failure that can occur while serving a single query is a
//! [`CommandError`]. These are recoverable at the dispatch boundary: they
//! become the error payload of a response frame and never tear down the
//! process. Failures while registering commands are [`DefineError`]s and
//! surface during the startup registration phase instead.

use serde_json::Value;
use thiserror::Error;

/// Errors surfaced while resolving, binding, or executing a single query.
///
/// The display strings are part of the wire contract: remote consoles show
/// them verbatim as the error payload of a response frame.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A required positional parameter received no argument.
    #[error("Missing required argument for parameter: {parameter}")]
    MissingArgument { parameter: String },

    /// A parameter was bound more than once, or an option was named
    /// without a following value token.
    #[error("Duplicate argument for parameter: {parameter}")]
    DuplicateArgument { parameter: String },

    /// A single-dash token named an option the command does not declare.
    #[error("Unrecognized option: {option}")]
    UnrecognizedOption { option: String },

    /// A double-dash token named a flag the command does not declare.
    #[error("Invalid flag: {flag}")]
    InvalidFlag { flag: String },

    /// Tokens were left over after every declared parameter was bound.
    /// The positional phase reports no token list; the option phase
    /// appends the tokens remaining past the stray one.
    #[error("Too many arguments{}", leftover_json(.tokens))]
    TooManyArguments { tokens: Vec<String> },

    /// The query resolved to a path with no registered command.
    #[error("Command not found")]
    CommandNotFound { path: String },

    /// The query resolved to a category, which cannot be executed.
    #[error("Cannot execute category")]
    CategoryNotExecutable { path: String },

    /// A request query was neither a string nor an array of strings.
    #[error("Invalid message format.")]
    InvalidMessageFormat,

    /// A command handler panicked while executing.
    #[error("Exception while executing command '{path}': {message}")]
    HandlerException {
        path: String,
        message: String,
        args: Value,
    },
}

impl CommandError {
    /// Creates a missing-argument error for the named parameter.
    pub fn missing_argument(parameter: impl Into<String>) -> Self {
        Self::MissingArgument {
            parameter: parameter.into(),
        }
    }

    /// Creates a duplicate-argument error for the named parameter.
    pub fn duplicate_argument(parameter: impl Into<String>) -> Self {
        Self::DuplicateArgument {
            parameter: parameter.into(),
        }
    }

    /// Creates an unrecognized-option error.
    pub fn unrecognized_option(option: impl Into<String>) -> Self {
        Self::UnrecognizedOption {
            option: option.into(),
        }
    }

    /// Creates an invalid-flag error.
    pub fn invalid_flag(flag: impl Into<String>) -> Self {
        Self::InvalidFlag { flag: flag.into() }
    }

    /// Creates a too-many-arguments error carrying the leftover tokens.
    pub fn too_many_arguments(tokens: Vec<String>) -> Self {
        Self::TooManyArguments { tokens }
    }

    /// Creates a command-not-found error for the resolved path.
    pub fn command_not_found(path: impl Into<String>) -> Self {
        Self::CommandNotFound { path: path.into() }
    }

    /// Creates a category-not-executable error for the resolved path.
    pub fn category_not_executable(path: impl Into<String>) -> Self {
        Self::CategoryNotExecutable { path: path.into() }
    }

    /// Creates a handler-exception error carrying the command path and the
    /// arguments that were bound when the handler panicked.
    pub fn handler_exception(
        path: impl Into<String>,
        message: impl Into<String>,
        args: Value,
    ) -> Self {
        Self::HandlerException {
            path: path.into(),
            message: message.into(),
            args,
        }
    }
}

fn leftover_json(tokens: &[String]) -> String {
    if tokens.is_empty() {
        return String::new();
    }
    let listed = serde_json::to_string(tokens).unwrap_or_else(|_| String::from("[]"));
    format!(" {listed}")
}

/// Errors surfaced while registering a command definition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DefineError {
    /// The definition's path was empty.
    #[error("command path must not be empty")]
    EmptyPath,

    /// A parameter spec produced an empty name.
    #[error("parameter name must not be empty")]
    EmptyParameterName,

    /// A flag spec declared a default value. Flags are never required, so a
    /// default other than boolean false is meaningless.
    #[error("flag '{name}' must not declare a default value")]
    FlagDefault { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_strings_match_wire_contract() {
        assert_eq!(
            CommandError::missing_argument("host").to_string(),
            "Missing required argument for parameter: host"
        );
        assert_eq!(
            CommandError::command_not_found("a.b").to_string(),
            "Command not found"
        );
        assert_eq!(
            CommandError::category_not_executable("a").to_string(),
            "Cannot execute category"
        );
        assert_eq!(
            CommandError::InvalidMessageFormat.to_string(),
            "Invalid message format."
        );
    }

    #[test]
    fn too_many_arguments_lists_leftover_tokens() {
        let error =
            CommandError::too_many_arguments(vec![String::from("x"), String::from("y")]);
        assert_eq!(error.to_string(), r#"Too many arguments ["x","y"]"#);
    }

    #[test]
    fn too_many_arguments_without_tokens_has_no_suffix() {
        let error = CommandError::too_many_arguments(Vec::new());
        assert_eq!(error.to_string(), "Too many arguments");
    }
}
