//! The path-addressed command registry.
//!
//! [`CommandSet`] owns the mapping from dot-delimited path to command tree
//! node. Registering a command synthesizes a [`Category`] at every ancestor
//! prefix not yet present, so the path resolver can walk the tree one
//! segment at a time against the known-path set.

use std::collections::{HashMap, HashSet};

use crate::command::{Category, Command, CommandDefinition, CommandNode};
use crate::errors::DefineError;

/// A collection of commands and the categories scaffolding their paths.
///
/// Enumeration follows first-registration order so help listings are
/// stable. Registration is expected to finish before queries are served;
/// the set has no interior locking.
#[derive(Debug, Default)]
pub struct CommandSet {
    nodes: HashMap<String, CommandNode>,
    order: Vec<String>,
    paths: HashSet<String>,
}

impl CommandSet {
    /// Creates an empty command set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command, synthesizing ancestor categories as needed.
    ///
    /// Registering at a path that already holds a node (a synthesized
    /// category or an earlier command) overwrites that node in place.
    ///
    /// # Errors
    ///
    /// Returns a [`DefineError`] when the path is empty or a parameter spec
    /// is invalid.
    pub fn define(&mut self, definition: CommandDefinition) -> Result<&Command, DefineError> {
        if definition.path.is_empty() {
            return Err(DefineError::EmptyPath);
        }

        let path = definition.path.clone();
        let command = Command::from_definition(definition)?;

        self.add_paths_and_categories(&path);
        self.insert(path.clone(), CommandNode::Command(command));

        match self.nodes.get(&path).and_then(CommandNode::as_command) {
            Some(command) => Ok(command),
            // insert() above guarantees the entry exists and is a command.
            None => Err(DefineError::EmptyPath),
        }
    }

    /// Looks up the node registered at an exact path.
    pub fn get(&self, path: &str) -> Option<&CommandNode> {
        self.nodes.get(path)
    }

    /// Returns every node whose path starts with `path`, in registration
    /// order, optionally bounded to `max_depth` extra dot-separated
    /// segments beyond `path`.
    ///
    /// The match is a raw string-prefix test, not a segment-boundary test:
    /// `"cat1"` also matches `"cat10.cmd"`. Callers relying on listings
    /// should pick prefixes that are not prefixes of sibling names.
    pub fn descendants(&self, path: &str, max_depth: Option<usize>) -> Vec<&CommandNode> {
        let mut result = Vec::new();
        for registered in &self.order {
            if !registered.starts_with(path) {
                continue;
            }

            if let Some(depth) = max_depth.filter(|depth| *depth > 0) {
                let sub_path = registered.get(path.len() + 1..).unwrap_or_default();
                if !sub_path.is_empty() && sub_path.split('.').count() > depth {
                    continue;
                }
            }

            if let Some(node) = self.nodes.get(registered) {
                result.push(node);
            }
        }
        result
    }

    /// Whether the path names a registered command or category, including
    /// every ancestor prefix of a registered path.
    pub fn is_path(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// Registered paths in first-registration order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    fn add_paths_and_categories(&mut self, path: &str) {
        let parts: Vec<&str> = path.split('.').collect();
        if parts.len() > 1 {
            let mut prefix = String::new();
            for part in parts {
                if !prefix.is_empty() {
                    prefix.push('.');
                }
                prefix.push_str(part);

                self.paths.insert(prefix.clone());
                if !self.nodes.contains_key(&prefix) {
                    self.insert(
                        prefix.clone(),
                        CommandNode::Category(Category::new(prefix.clone())),
                    );
                }
            }
        } else {
            self.paths.insert(path.to_owned());
        }
    }

    fn insert(&mut self, path: String, node: CommandNode) {
        if !self.nodes.contains_key(&path) {
            self.order.push(path.clone());
        }
        self.nodes.insert(path, node);
    }
}
