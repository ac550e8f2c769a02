//! Greedy longest-known-prefix resolution of query tokens.
//!
//! The resolver walks a token list left to right, folding tokens into a
//! lowercased dot-joined path for as long as each candidate stays within
//! the registry's known-path set. The first unknown token stops the walk:
//! it and everything after it are handed to the argument binder, unless it
//! is a help token, which flags the query as a help request instead.

use crate::registry::CommandSet;

/// Tokens that request help for the path resolved so far.
const HELP_TOKENS: [&str; 2] = ["?", "--help"];

/// The outcome of resolving a token list against the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedQuery {
    /// The longest known path, lowercased; empty means the root.
    pub path: String,
    /// The tokens left over for argument binding.
    pub remaining: Vec<String>,
    /// Whether the query asked for help.
    pub is_help: bool,
}

/// Resolves query tokens to the longest registered path prefix.
///
/// The walk is greedy and never backtracks: it stops at the first segment
/// that does not extend a known path, and never looks past it. An empty
/// head token also terminates the walk.
pub fn resolve(commands: &CommandSet, tokens: &[String]) -> ResolvedQuery {
    let mut consumed: Vec<&str> = Vec::new();
    let mut index = 0;

    loop {
        let Some(head) = tokens.get(index).filter(|head| !head.is_empty()) else {
            return ResolvedQuery {
                path: joined(&consumed),
                remaining: Vec::new(),
                is_help: false,
            };
        };

        let mut candidate_segments = consumed.clone();
        candidate_segments.push(head);
        let candidate = joined(&candidate_segments);

        if !commands.is_path(&candidate) {
            if HELP_TOKENS.contains(&head.as_str()) {
                return ResolvedQuery {
                    path: joined(&consumed),
                    remaining: Vec::new(),
                    is_help: true,
                };
            }
            return ResolvedQuery {
                path: joined(&consumed),
                remaining: tokens[index..].to_vec(),
                is_help: false,
            };
        }

        consumed.push(head);
        index += 1;
    }
}

fn joined(segments: &[&str]) -> String {
    segments.join(".").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandDefinition;

    fn tokens(list: &[&str]) -> Vec<String> {
        list.iter().map(|token| (*token).to_owned()).collect()
    }

    fn commands_with_ab() -> CommandSet {
        let mut commands = CommandSet::new();
        commands
            .define(CommandDefinition::new("a.b"))
            .expect("define");
        commands
    }

    #[test]
    fn unknown_tail_tokens_become_arguments() {
        let commands = commands_with_ab();
        let resolved = resolve(&commands, &tokens(&["a", "b", "c"]));
        assert_eq!(resolved.path, "a.b");
        assert_eq!(resolved.remaining, tokens(&["c"]));
        assert!(!resolved.is_help);
    }

    #[test]
    fn question_mark_requests_help_for_resolved_path() {
        let commands = commands_with_ab();
        let resolved = resolve(&commands, &tokens(&["a", "b", "?"]));
        assert_eq!(resolved.path, "a.b");
        assert!(resolved.remaining.is_empty());
        assert!(resolved.is_help);
    }

    #[test]
    fn double_dash_help_requests_help_for_resolved_path() {
        let commands = commands_with_ab();
        let resolved = resolve(&commands, &tokens(&["a", "b", "--help"]));
        assert_eq!(resolved.path, "a.b");
        assert!(resolved.is_help);
    }

    #[test]
    fn help_at_root_resolves_to_empty_path() {
        let commands = commands_with_ab();
        let resolved = resolve(&commands, &tokens(&["?"]));
        assert_eq!(resolved.path, "");
        assert!(resolved.is_help);
    }

    #[test]
    fn exhausted_tokens_resolve_to_path_so_far() {
        let commands = commands_with_ab();
        let resolved = resolve(&commands, &tokens(&["a", "b"]));
        assert_eq!(resolved.path, "a.b");
        assert!(resolved.remaining.is_empty());
        assert!(!resolved.is_help);
    }

    #[test]
    fn unknown_first_token_leaves_everything_as_arguments() {
        let commands = commands_with_ab();
        let resolved = resolve(&commands, &tokens(&["x", "y"]));
        assert_eq!(resolved.path, "");
        assert_eq!(resolved.remaining, tokens(&["x", "y"]));
    }

    #[test]
    fn path_matching_lowercases_candidates() {
        let commands = commands_with_ab();
        let resolved = resolve(&commands, &tokens(&["A", "B"]));
        assert_eq!(resolved.path, "a.b");
    }

    #[test]
    fn empty_head_token_terminates_the_walk() {
        let commands = commands_with_ab();
        let resolved = resolve(&commands, &tokens(&["a", "", "c"]));
        assert_eq!(resolved.path, "a");
        assert!(resolved.remaining.is_empty());
        assert!(!resolved.is_help);
    }

    #[test]
    fn walk_never_looks_past_first_unknown_segment() {
        let mut commands = CommandSet::new();
        commands
            .define(CommandDefinition::new("a.b.c"))
            .expect("define");
        // "x" is unknown under "a", so "b" and "c" become arguments even
        // though "a.b.c" exists.
        let resolved = resolve(&commands, &tokens(&["a", "x", "b", "c"]));
        assert_eq!(resolved.path, "a");
        assert_eq!(resolved.remaining, tokens(&["x", "b", "c"]));
    }
}
