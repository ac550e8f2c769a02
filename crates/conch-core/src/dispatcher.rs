//! Query parsing, execution, and help generation over a command set.
//!
//! The dispatcher composes the registry, the path resolver, and the
//! argument binder behind three operations: `parse_query` turns a raw
//! query into a bound, executable shape; `execute` runs a command body
//! through a single indirection point that converts panics into structured
//! errors; `help` renders usage listings for a path and its direct
//! children.

use std::panic::{self, AssertUnwindSafe};

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::binder;
use crate::command::{ArgMap, Command, CommandDefinition, CommandNode, CommandResult};
use crate::errors::{CommandError, DefineError};
use crate::registry::CommandSet;
use crate::resolver::{self, ResolvedQuery};

/// Tracing target for dispatch operations.
const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// A raw query: one space-delimited line, or an already-split token list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Query {
    /// A token list, forwarded as-is.
    Tokens(Vec<String>),
    /// A single line, split on spaces.
    Line(String),
}

impl Query {
    fn into_tokens(self) -> Vec<String> {
        match self {
            Self::Tokens(tokens) => tokens,
            Self::Line(line) => line.split(' ').map(ToOwned::to_owned).collect(),
        }
    }
}

impl From<&str> for Query {
    fn from(line: &str) -> Self {
        Self::Line(line.to_owned())
    }
}

impl From<Vec<String>> for Query {
    fn from(tokens: Vec<String>) -> Self {
        Self::Tokens(tokens)
    }
}

/// A query resolved and bound against the registry, ready to execute or to
/// render help for.
#[derive(Debug, Clone)]
pub struct ParsedQuery {
    /// The resolved command or category path; empty means the root.
    pub path: String,
    /// Bound argument values by parameter name; empty for help shapes.
    pub args: ArgMap,
    /// Whether the caller should render help instead of executing.
    pub is_help: bool,
}

impl ParsedQuery {
    fn help_shape(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            args: ArgMap::new(),
            is_help: true,
        }
    }
}

/// Composes the registry, resolver, and binder into one dispatch surface.
#[derive(Debug, Default)]
pub struct Dispatcher {
    commands: CommandSet,
}

impl Dispatcher {
    /// Creates a dispatcher with an empty command set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a dispatcher over an existing command set.
    pub fn with_commands(commands: CommandSet) -> Self {
        Self { commands }
    }

    /// Registers a command. Registration is expected to finish before
    /// queries are served.
    ///
    /// # Errors
    ///
    /// Returns a [`DefineError`] for an invalid definition.
    pub fn define(&mut self, definition: CommandDefinition) -> Result<&Command, DefineError> {
        self.commands.define(definition)
    }

    /// The underlying command set.
    pub fn commands(&self) -> &CommandSet {
        &self.commands
    }

    /// Resolves and binds a query.
    ///
    /// Returns `Ok(None)` when the query names no registered path. Help
    /// requests and category paths produce a help shape with empty
    /// arguments.
    ///
    /// # Errors
    ///
    /// Returns a binding [`CommandError`] from the argument phase.
    pub fn parse_query(&self, query: Query) -> Result<Option<ParsedQuery>, CommandError> {
        let tokens = query.into_tokens();
        let resolved: ResolvedQuery = resolver::resolve(&self.commands, &tokens);

        if resolved.path.is_empty() && resolved.is_help {
            return Ok(Some(ParsedQuery::help_shape("")));
        }

        let Some(node) = self.commands.get(&resolved.path) else {
            return Ok(None);
        };

        if resolved.is_help || node.is_category() {
            return Ok(Some(ParsedQuery::help_shape(node.path())));
        }

        let Some(command) = node.as_command() else {
            return Ok(Some(ParsedQuery::help_shape(node.path())));
        };

        let bound = binder::bind(command, &resolved.remaining)?;
        Ok(Some(ParsedQuery {
            path: resolved.path,
            args: bound.into_by_name(),
            is_help: false,
        }))
    }

    /// Executes the command registered at `path` with bound arguments.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::CommandNotFound`] for an unregistered path,
    /// [`CommandError::CategoryNotExecutable`] for a category, and
    /// [`CommandError::HandlerException`] when the handler panics. A
    /// handler-reported failure arrives inside the `Ok` result instead.
    pub fn execute(&self, path: &str, args: &ArgMap) -> Result<CommandResult, CommandError> {
        let Some(node) = self.commands.get(path) else {
            return Err(CommandError::command_not_found(path));
        };
        let Some(command) = node.as_command() else {
            return Err(CommandError::category_not_executable(path));
        };

        debug!(target: DISPATCH_TARGET, path, "executing command");
        self.on_execute(command, args)
    }

    /// Renders help for a path: the verbose usage of a single matching
    /// command, or one summary block per direct command and one marker per
    /// direct sub-category.
    pub fn help(&self, path: &str) -> String {
        let nodes = self.commands.descendants(path, Some(1));
        let mut commands = Vec::new();
        let mut categories = Vec::new();

        for node in nodes {
            match node {
                CommandNode::Category(category) => {
                    if category.path() != path {
                        categories.push(category);
                    }
                }
                CommandNode::Command(command) => commands.push(command),
            }
        }

        let mut buffer = Vec::new();
        if let [command] = commands.as_slice()
            && categories.is_empty()
        {
            buffer.push(command.verbose_usage());
        } else {
            for command in &commands {
                buffer.push(command_summary(command));
            }
            for category in &categories {
                buffer.push(category_marker(category.path()));
            }
        }
        buffer.join("\n")
    }

    /// The single indirection point every execution passes through. A
    /// panicking handler is converted into a structured error carrying the
    /// command path and its bound arguments.
    fn on_execute(&self, command: &Command, args: &ArgMap) -> Result<CommandResult, CommandError> {
        panic::catch_unwind(AssertUnwindSafe(|| command.invoke(args))).map_err(|payload| {
            CommandError::handler_exception(
                command.path(),
                panic_message(payload.as_ref()),
                serde_json::to_value(args).unwrap_or(Value::Null),
            )
        })
    }
}

fn command_summary(command: &Command) -> String {
    let name = command.path().split('.').next_back().unwrap_or_default();
    format!(
        " > {name}\n   USAGE: {}\n   DESCR: {}\n",
        command.usage(),
        command.description()
    )
}

fn category_marker(path: &str) -> String {
    format!(">> {} [?]\n", path.split('.').collect::<Vec<_>>().join(" "))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("handler panicked")
    }
}
