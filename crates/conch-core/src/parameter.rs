//! Parameter declarations and the specs they are built from.
//!
//! A command declares its argument slots as [`Parameter`]s. Registration
//! accepts either shorthand strings (`"name"`, `"name=default"`) or full
//! descriptors with a description and arbitrary extra metadata; both forms
//! resolve into one canonical [`Parameter`] record at registration time.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::errors::DefineError;

/// A bound argument value: text for positionals and options, boolean for
/// flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ArgValue {
    /// A textual value, as produced by positional and option binding.
    Text(String),
    /// A boolean value, as produced by flag binding.
    Flag(bool),
}

impl ArgValue {
    /// Returns the textual value, if this is a text argument.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            Self::Flag(_) => None,
        }
    }

    /// Returns the boolean value, if this is a flag argument.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Text(_) => None,
            Self::Flag(value) => Some(*value),
        }
    }

    /// Returns true for an empty text value or a false flag. Such values are
    /// treated as absent during binding and replaced by the parameter
    /// default.
    pub(crate) fn is_vacant(&self) -> bool {
        match self {
            Self::Text(value) => value.is_empty(),
            Self::Flag(value) => !*value,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => formatter.write_str(value),
            Self::Flag(value) => write!(formatter, "{value}"),
        }
    }
}

/// A parameter spec supplied at registration time.
///
/// Shorthand strings carry a name and an optional default separated by the
/// first `=`. Descriptors additionally carry a description and an open map
/// of extra metadata copied onto the parameter.
#[derive(Debug, Clone)]
pub enum ParamSpec {
    /// `"name"` or `"name=default"`.
    Shorthand(String),
    /// A full descriptor.
    Descriptor {
        name: String,
        default_value: Option<String>,
        description: Option<String>,
        extra: Map<String, Value>,
    },
}

impl ParamSpec {
    /// Creates a descriptor spec with a name and description and no default.
    pub fn described(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::Descriptor {
            name: name.into(),
            default_value: None,
            description: Some(description.into()),
            extra: Map::new(),
        }
    }

    /// Creates a descriptor spec with a name, default value, and
    /// description.
    pub fn with_default(
        name: impl Into<String>,
        default_value: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::Descriptor {
            name: name.into(),
            default_value: Some(default_value.into()),
            description: Some(description.into()),
            extra: Map::new(),
        }
    }
}

impl From<&str> for ParamSpec {
    fn from(spec: &str) -> Self {
        Self::Shorthand(spec.to_owned())
    }
}

impl From<String> for ParamSpec {
    fn from(spec: String) -> Self {
        Self::Shorthand(spec)
    }
}

/// A named argument slot declared by a command.
///
/// The name, default, kind, and extra metadata are fixed at registration.
/// Only the description may be updated afterwards, so that help text can be
/// attached late.
#[derive(Debug, Clone)]
pub struct Parameter {
    name: String,
    default_value: Option<String>,
    description: String,
    extra: Map<String, Value>,
    is_flag: bool,
}

impl Parameter {
    /// Resolves a spec into a parameter.
    ///
    /// # Errors
    ///
    /// Returns [`DefineError::EmptyParameterName`] for an empty name and
    /// [`DefineError::FlagDefault`] when a flag spec declares a default.
    pub(crate) fn from_spec(spec: ParamSpec, is_flag: bool) -> Result<Self, DefineError> {
        let (name, default_value, description, extra) = match spec {
            ParamSpec::Shorthand(text) => {
                let mut parts = text.splitn(2, '=');
                let name = parts.next().unwrap_or_default().to_owned();
                let default_value = parts.next().map(ToOwned::to_owned);
                (name, default_value, String::new(), Map::new())
            }
            ParamSpec::Descriptor {
                name,
                default_value,
                description,
                extra,
            } => (name, default_value, description.unwrap_or_default(), extra),
        };

        if name.is_empty() {
            return Err(DefineError::EmptyParameterName);
        }
        if is_flag && default_value.is_some() {
            return Err(DefineError::FlagDefault { name });
        }

        Ok(Self {
            name,
            default_value,
            description,
            extra,
            is_flag,
        })
    }

    /// The parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a default value was declared. Always false for flags, since
    /// the absence of a flag is itself a valid value.
    pub fn has_default(&self) -> bool {
        !self.is_flag && self.default_value.is_some()
    }

    /// The value used when no argument is supplied: the declared default,
    /// the empty string for options and positionals without one, and
    /// boolean false for flags.
    pub fn default_value(&self) -> ArgValue {
        if self.is_flag {
            ArgValue::Flag(false)
        } else {
            ArgValue::Text(self.default_value.clone().unwrap_or_default())
        }
    }

    /// The declared default as text, when present.
    pub fn declared_default(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// The help description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Replaces the help description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Extra metadata carried by descriptor specs.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Whether this parameter is a flag.
    pub fn is_flag(&self) -> bool {
        self.is_flag
    }
}
