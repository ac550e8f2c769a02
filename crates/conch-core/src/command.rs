//! Command and category nodes of the dispatch tree.
//!
//! A [`Command`] is an executable node addressed by a dot-delimited path and
//! carrying ordered positional parameters, named options, and flags. A
//! [`Category`] is a non-executable placeholder standing in for an
//! intermediate path segment; executing one is always an error. Both are
//! held behind the [`CommandNode`] tagged union.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::errors::DefineError;
use crate::parameter::{ArgValue, ParamSpec, Parameter};

/// The flattened arguments a handler receives: one entry per declared
/// positional, option, and flag parameter.
pub type ArgMap = HashMap<String, ArgValue>;

/// Outcome of a command handler: a reply payload array, or an error value
/// (a string or structured object) forwarded to the caller verbatim.
pub type CommandResult = Result<Vec<Value>, Value>;

/// A command execution body. Completing is returning; the
/// completes-exactly-once contract of the callback style this replaces is
/// enforced by the type.
pub type Handler = dyn Fn(&ArgMap) -> CommandResult + Send + Sync;

/// Registration-time description of a command.
///
/// Parameter slots accept shorthand strings or full descriptors; see
/// [`ParamSpec`]. A definition without a handler registers a command whose
/// execution succeeds with an empty payload.
#[derive(Clone)]
pub struct CommandDefinition {
    pub(crate) path: String,
    params: Vec<ParamSpec>,
    options: Vec<ParamSpec>,
    flags: Vec<ParamSpec>,
    description: String,
    extra: Map<String, Value>,
    handler: Option<Arc<Handler>>,
}

impl CommandDefinition {
    /// Starts a definition for the given dot-delimited path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: Vec::new(),
            options: Vec::new(),
            flags: Vec::new(),
            description: String::new(),
            extra: Map::new(),
            handler: None,
        }
    }

    /// Sets the help description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Appends a positional parameter. Declaration order is binding order.
    #[must_use]
    pub fn param(mut self, spec: impl Into<ParamSpec>) -> Self {
        self.params.push(spec.into());
        self
    }

    /// Appends an option parameter (`-name value`).
    #[must_use]
    pub fn option(mut self, spec: impl Into<ParamSpec>) -> Self {
        self.options.push(spec.into());
        self
    }

    /// Appends a flag parameter (`--name`).
    #[must_use]
    pub fn flag(mut self, spec: impl Into<ParamSpec>) -> Self {
        self.flags.push(spec.into());
        self
    }

    /// Attaches extra metadata to the command.
    #[must_use]
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Sets the execution body.
    #[must_use]
    pub fn handler(
        mut self,
        handler: impl Fn(&ArgMap) -> CommandResult + Send + Sync + 'static,
    ) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }
}

impl fmt::Debug for CommandDefinition {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CommandDefinition")
            .field("path", &self.path)
            .field("params", &self.params)
            .field("options", &self.options)
            .field("flags", &self.flags)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// An executable command node.
pub struct Command {
    path: String,
    params: Vec<Parameter>,
    options: Vec<Parameter>,
    flags: Vec<Parameter>,
    description: String,
    extra: Map<String, Value>,
    handler: Arc<Handler>,
}

impl Command {
    /// Builds a command from a definition, resolving every parameter spec.
    pub(crate) fn from_definition(definition: CommandDefinition) -> Result<Self, DefineError> {
        if definition.path.is_empty() {
            return Err(DefineError::EmptyPath);
        }

        let params = resolve_specs(definition.params, false)?;
        let options = resolve_specs(definition.options, false)?;
        let flags = resolve_specs(definition.flags, true)?;

        Ok(Self {
            path: definition.path,
            params,
            options,
            flags,
            description: definition.description,
            extra: definition.extra,
            handler: definition
                .handler
                .unwrap_or_else(|| Arc::new(|_| Ok(Vec::new()))),
        })
    }

    /// The dot-delimited path this command is registered at.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Positional parameters, in binding order.
    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    /// Option parameters, in declaration order.
    pub fn options(&self) -> &[Parameter] {
        &self.options
    }

    /// Flag parameters, in declaration order.
    pub fn flags(&self) -> &[Parameter] {
        &self.flags
    }

    /// The help description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Extra metadata attached at registration.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Invokes the execution body with bound arguments.
    pub(crate) fn invoke(&self, args: &ArgMap) -> CommandResult {
        (self.handler)(args)
    }

    /// One-line usage text: parent path words, command name, `<name>` for
    /// required positionals, `[name]` for defaulted ones, `[-name]` per
    /// option, and `[--name]` per flag.
    pub fn usage(&self) -> String {
        let mut segments: Vec<&str> = self.path.split('.').collect();
        let name = segments.pop().unwrap_or_default();

        let mut buffer = Vec::new();
        buffer.push(segments.join(" "));
        buffer.push(name.to_owned());

        for param in &self.params {
            if param.has_default() {
                buffer.push(format!("[{}]", param.name()));
            } else {
                buffer.push(format!("<{}>", param.name()));
            }
        }
        for option in &self.options {
            buffer.push(format!("[-{}]", option.name()));
        }
        for flag in &self.flags {
            buffer.push(format!("[--{}]", flag.name()));
        }

        buffer.join(" ")
    }

    /// Usage text followed by the command description and an indented line
    /// per described parameter.
    pub fn verbose_usage(&self) -> String {
        let mut buffer = String::new();
        buffer.push_str(&self.usage());
        buffer.push('\n');
        buffer.push_str(&self.description);

        let described_params: Vec<&Parameter> = self
            .params
            .iter()
            .filter(|param| !param.description().is_empty())
            .collect();
        if !described_params.is_empty() {
            buffer.push('\n');
            for param in described_params {
                if param.has_default() {
                    buffer.push_str(&format!(
                        "  {} - {}\n",
                        param.name(),
                        param.description()
                    ));
                } else {
                    buffer.push_str(&format!(
                        "  {}={} - {}\n",
                        param.name(),
                        param.declared_default().unwrap_or_default(),
                        param.description()
                    ));
                }
            }
        }

        let described_options: Vec<&Parameter> = self
            .options
            .iter()
            .filter(|option| !option.description().is_empty())
            .collect();
        if !described_options.is_empty() {
            buffer.push('\n');
            for option in described_options {
                if option.has_default() {
                    buffer.push_str(&format!(
                        "  -{} <value> - {}\n",
                        option.name(),
                        option.description()
                    ));
                } else {
                    buffer.push_str(&format!(
                        "  -{} <value={}> - {}\n",
                        option.name(),
                        option.declared_default().unwrap_or_default(),
                        option.description()
                    ));
                }
            }
        }

        let described_flags: Vec<&Parameter> = self
            .flags
            .iter()
            .filter(|flag| !flag.description().is_empty())
            .collect();
        if !described_flags.is_empty() {
            buffer.push('\n');
            for flag in described_flags {
                buffer.push_str(&format!("  --{} - {}\n", flag.name(), flag.description()));
            }
        }

        buffer
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Command")
            .field("path", &self.path)
            .field("params", &self.params)
            .field("options", &self.options)
            .field("flags", &self.flags)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// A non-executable placeholder for an intermediate path segment.
#[derive(Debug, Clone)]
pub struct Category {
    path: String,
    description: String,
}

impl Category {
    /// Creates a category at the given path.
    pub(crate) fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            description: String::new(),
        }
    }

    /// The dot-delimited path this category stands at.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The help description.
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// A node of the command tree.
#[derive(Debug)]
pub enum CommandNode {
    /// An executable command.
    Command(Command),
    /// A placeholder for an intermediate path segment.
    Category(Category),
}

impl CommandNode {
    /// The node's registered path.
    pub fn path(&self) -> &str {
        match self {
            Self::Command(command) => command.path(),
            Self::Category(category) => category.path(),
        }
    }

    /// Whether this node is a category.
    pub fn is_category(&self) -> bool {
        matches!(self, Self::Category(_))
    }

    /// Returns the command when this node is executable.
    pub fn as_command(&self) -> Option<&Command> {
        match self {
            Self::Command(command) => Some(command),
            Self::Category(_) => None,
        }
    }
}

fn resolve_specs(specs: Vec<ParamSpec>, is_flag: bool) -> Result<Vec<Parameter>, DefineError> {
    specs
        .into_iter()
        .map(|spec| Parameter::from_spec(spec, is_flag))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::ParamSpec;

    fn command(definition: CommandDefinition) -> Command {
        Command::from_definition(definition).expect("definition")
    }

    #[test]
    fn usage_marks_required_and_defaulted_positionals() {
        let cmd = command(
            CommandDefinition::new("pool.worker.restart")
                .param("name")
                .param("delay=0")
                .option("reason")
                .flag("force"),
        );
        assert_eq!(
            cmd.usage(),
            "pool worker restart <name> [delay] [-reason] [--force]"
        );
    }

    #[test]
    fn usage_for_root_level_command_keeps_empty_parent_segment() {
        let cmd = command(CommandDefinition::new("ping"));
        // The parent-path segment is empty for a root-level command, leaving
        // a leading separator in the joined text.
        assert_eq!(cmd.usage(), " ping");
    }

    #[test]
    fn verbose_usage_lists_described_parameters_only() {
        let cmd = command(
            CommandDefinition::new("sys.echo")
                .description("Echo text back")
                .param(ParamSpec::described("text", "the text to echo"))
                .param("silent")
                .option(ParamSpec::with_default("prefix", ">", "reply prefix"))
                .flag(ParamSpec::described("upper", "uppercase the reply")),
        );
        let verbose = cmd.verbose_usage();
        assert!(verbose.starts_with("sys echo <text> <silent> [-prefix] [--upper]\n"));
        assert!(verbose.contains("Echo text back"));
        assert!(verbose.contains("  text= - the text to echo\n"));
        assert!(!verbose.contains("silent -"));
        assert!(verbose.contains("  -prefix <value> - reply prefix\n"));
        assert!(verbose.contains("  --upper - uppercase the reply\n"));
    }

    #[test]
    fn default_handler_succeeds_with_empty_payload() {
        let cmd = command(CommandDefinition::new("noop"));
        let result = cmd.invoke(&ArgMap::new()).expect("default handler");
        assert!(result.is_empty());
    }

    #[test]
    fn empty_path_is_rejected() {
        let error = Command::from_definition(CommandDefinition::new("")).expect_err("empty path");
        assert_eq!(error, DefineError::EmptyPath);
    }
}
