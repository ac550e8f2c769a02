//! Argument binding for a resolved command.
//!
//! Binding runs in two phases. Positional parameters consume leading
//! tokens in declaration order, falling back to declared defaults. The
//! remaining tokens must then be `-option value` pairs and `--flag`
//! markers; anything else is an error. Values in either phase go through
//! quote-aware tokenization so multi-word literals survive the flat token
//! list the wire protocol delivers.
//!
//! A successful bind always produces exactly one entry per declared
//! parameter in the flattened name map: explicit tokens where given,
//! defaults everywhere else.

use std::collections::{HashMap, VecDeque};

use crate::command::{ArgMap, Command};
use crate::errors::CommandError;
use crate::parameter::{ArgValue, Parameter};

const OPTION_PREFIX: &str = "-";
const FLAG_PREFIX: &str = "--";
const QUOTES: [char; 3] = ['"', '\'', '`'];

/// A single bound argument, recording whether the value came from a
/// default rather than an explicit token.
#[derive(Debug, Clone)]
pub struct BoundArg {
    parameter: Parameter,
    value: ArgValue,
    is_default: bool,
}

impl BoundArg {
    /// Binds a value to a parameter. A missing value, an empty text value,
    /// or a false flag all count as absent and take the parameter default.
    pub(crate) fn new(parameter: &Parameter, value: Option<ArgValue>) -> Self {
        let is_default = value.as_ref().is_none_or(ArgValue::is_vacant);
        let value = if is_default {
            parameter.default_value()
        } else {
            // is_default above rules out None.
            value.unwrap_or_else(|| parameter.default_value())
        };
        Self {
            parameter: parameter.clone(),
            value,
            is_default,
        }
    }

    /// The parameter this argument is bound to.
    pub fn parameter(&self) -> &Parameter {
        &self.parameter
    }

    /// The parameter name.
    pub fn name(&self) -> &str {
        self.parameter.name()
    }

    /// The bound value.
    pub fn value(&self) -> &ArgValue {
        &self.value
    }

    /// True when the value came from the parameter default. An explicit
    /// token that merely equals the default still reports false here.
    pub fn is_default(&self) -> bool {
        self.is_default
    }
}

/// The complete result of binding a command's tokens.
#[derive(Debug, Default)]
pub struct BoundArgs {
    params: Vec<BoundArg>,
    options: HashMap<String, BoundArg>,
    flags: HashMap<String, BoundArg>,
    by_name: ArgMap,
}

impl BoundArgs {
    /// Positional arguments in binding order.
    pub fn params(&self) -> &[BoundArg] {
        &self.params
    }

    /// Option arguments by parameter name.
    pub fn options(&self) -> &HashMap<String, BoundArg> {
        &self.options
    }

    /// Flag arguments by parameter name.
    pub fn flags(&self) -> &HashMap<String, BoundArg> {
        &self.flags
    }

    /// The flattened value map handlers receive.
    pub fn by_name(&self) -> &ArgMap {
        &self.by_name
    }

    /// Consumes the binding, yielding the flattened value map.
    pub fn into_by_name(self) -> ArgMap {
        self.by_name
    }

    fn push_param(&mut self, arg: BoundArg) {
        self.by_name
            .insert(arg.name().to_owned(), arg.value().clone());
        self.params.push(arg);
    }

    fn push_option(&mut self, arg: BoundArg) {
        self.by_name
            .insert(arg.name().to_owned(), arg.value().clone());
        self.options.insert(arg.name().to_owned(), arg);
    }

    fn push_flag(&mut self, arg: BoundArg) {
        self.by_name
            .insert(arg.name().to_owned(), arg.value().clone());
        self.flags.insert(arg.name().to_owned(), arg);
    }
}

/// Binds a command's remaining query tokens to its declared parameters.
///
/// # Errors
///
/// Returns a [`CommandError`] describing the first binding failure; see
/// the crate error taxonomy.
pub fn bind(command: &Command, tokens: &[String]) -> Result<BoundArgs, CommandError> {
    let mut queue: VecDeque<String> = tokens.iter().cloned().collect();
    let mut results = BoundArgs::default();

    bind_positionals(command, &mut results, &mut queue)?;

    if command.options().is_empty() && command.flags().is_empty() {
        if !queue.is_empty() {
            // The positional phase reports no token list.
            return Err(CommandError::too_many_arguments(Vec::new()));
        }
        return Ok(results);
    }

    bind_options_and_flags(command, &mut results, &mut queue)?;

    Ok(results)
}

fn bind_positionals(
    command: &Command,
    results: &mut BoundArgs,
    queue: &mut VecDeque<String>,
) -> Result<(), CommandError> {
    let params = command.params();
    for (index, parameter) in params.iter().enumerate() {
        let mut value = None;

        if let Some(head) = queue.front() {
            if head.starts_with(OPTION_PREFIX) {
                // Options may not be interleaved before positionals are
                // satisfied; only a trailing defaulted positional may yield
                // to them.
                let more_positionals_remain = index + 1 < params.len();
                if more_positionals_remain || !parameter.has_default() {
                    return Err(CommandError::missing_argument(parameter.name()));
                }
                // Leave the option token for the next phase.
            } else {
                let head = queue.pop_front().unwrap_or_default();
                value = Some(take_value(head, queue));
            }
        }

        if value.is_none() && !parameter.has_default() {
            return Err(CommandError::missing_argument(parameter.name()));
        }
        if results.by_name.contains_key(parameter.name()) {
            return Err(CommandError::duplicate_argument(parameter.name()));
        }
        results.push_param(BoundArg::new(parameter, value.map(ArgValue::Text)));
    }
    Ok(())
}

fn bind_options_and_flags(
    command: &Command,
    results: &mut BoundArgs,
    queue: &mut VecDeque<String>,
) -> Result<(), CommandError> {
    let mut unbound_options: HashMap<&str, &Parameter> = command
        .options()
        .iter()
        .map(|option| (option.name(), option))
        .collect();
    let mut unbound_flags: HashMap<&str, &Parameter> = command
        .flags()
        .iter()
        .map(|flag| (flag.name(), flag))
        .collect();

    while let Some(token) = queue.pop_front() {
        if !token.starts_with(OPTION_PREFIX) {
            return Err(CommandError::too_many_arguments(
                queue.iter().cloned().collect(),
            ));
        }

        if let Some(name) = token.strip_prefix(FLAG_PREFIX) {
            let Some(parameter) = unbound_flags.remove(name) else {
                if results.flags.contains_key(name) {
                    return Err(CommandError::duplicate_argument(name));
                }
                return Err(CommandError::invalid_flag(name));
            };
            results.push_flag(BoundArg::new(parameter, Some(ArgValue::Flag(true))));
        } else if let Some(name) = token.strip_prefix(OPTION_PREFIX) {
            // A bound option is removed from the unbound map, so a repeat
            // occurrence reports as unrecognized.
            let Some(parameter) = unbound_options.remove(name) else {
                return Err(CommandError::unrecognized_option(name));
            };
            let Some(head) = queue.pop_front() else {
                return Err(CommandError::duplicate_argument(name));
            };
            let value = take_value(head, queue);
            results.push_option(BoundArg::new(parameter, Some(ArgValue::Text(value))));
        }
    }

    // Fill unbound options and flags with defaults, keeping declaration
    // order for determinism.
    for option in command.options() {
        if unbound_options.contains_key(option.name()) {
            results.push_option(BoundArg::new(option, None));
        }
    }
    for flag in command.flags() {
        if unbound_flags.contains_key(flag.name()) {
            results.push_flag(BoundArg::new(flag, None));
        }
    }

    Ok(())
}

/// Consumes a value token, joining subsequent tokens into a quoted literal
/// when the token opens with `"`, `'`, or a backtick.
///
/// The literal runs until a token ends with the opening quote character;
/// the other two quote characters are plain text inside it. A quote that
/// is not the very first character never opens a literal.
fn take_value(first: String, queue: &mut VecDeque<String>) -> String {
    let Some(quote) = first.chars().next().filter(|first_char| QUOTES.contains(first_char))
    else {
        return first;
    };

    let opening_rest = &first[quote.len_utf8()..];
    if let Some(single_token) = opening_rest.strip_suffix(quote) {
        return single_token.to_owned();
    }

    let mut literal: Vec<String> = vec![opening_rest.to_owned()];
    while let Some(token) = queue.pop_front() {
        if let Some(closing) = token.strip_suffix(quote) {
            literal.push(closing.to_owned());
            break;
        }
        literal.push(token);
    }
    literal.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandDefinition;

    fn tokens(list: &[&str]) -> Vec<String> {
        list.iter().map(|token| (*token).to_owned()).collect()
    }

    fn echo_command() -> Command {
        Command::from_definition(
            CommandDefinition::new("cat.cmd")
                .param("param1")
                .param("param2=7")
                .option("opt1")
                .option("opt2=hello")
                .flag("flag1")
                .flag("flag2"),
        )
        .expect("definition")
    }

    fn positional_only() -> Command {
        Command::from_definition(CommandDefinition::new("cat.cmd").param("param1"))
            .expect("definition")
    }

    #[test]
    fn binds_positionals_in_declared_order() {
        let command = echo_command();
        let bound = bind(&command, &tokens(&["x", "y"])).expect("bind");
        assert_eq!(bound.params()[0].name(), "param1");
        assert_eq!(bound.params()[0].value(), &ArgValue::Text("x".into()));
        assert!(!bound.params()[0].is_default());
        assert_eq!(bound.params()[1].value(), &ArgValue::Text("y".into()));
    }

    #[test]
    fn fills_missing_positional_from_default() {
        let command = echo_command();
        let bound = bind(&command, &tokens(&["x"])).expect("bind");
        assert_eq!(bound.params()[1].name(), "param2");
        assert!(bound.params()[1].is_default());
        assert_eq!(bound.params()[1].value(), &ArgValue::Text("7".into()));
    }

    #[test]
    fn missing_required_positional_fails() {
        let command = echo_command();
        let error = bind(&command, &[]).expect_err("missing");
        assert!(matches!(
            error,
            CommandError::MissingArgument { parameter } if parameter == "param1"
        ));
    }

    #[test]
    fn option_token_before_required_positional_fails() {
        let command = echo_command();
        let error = bind(&command, &tokens(&["-opt1", "v"])).expect_err("interleaved");
        assert!(matches!(error, CommandError::MissingArgument { .. }));
    }

    #[test]
    fn trailing_defaulted_positional_yields_to_options() {
        let command = echo_command();
        let bound = bind(&command, &tokens(&["x", "-opt1", "v"])).expect("bind");
        assert!(bound.params()[1].is_default());
        assert_eq!(
            bound.by_name().get("opt1"),
            Some(&ArgValue::Text("v".into()))
        );
    }

    #[test]
    fn binds_options_and_flags_by_name() {
        let command = echo_command();
        let bound = bind(&command, &tokens(&["v", "w", "-opt1", "o", "--flag1"])).expect("bind");
        assert_eq!(
            bound.by_name().get("opt1"),
            Some(&ArgValue::Text("o".into()))
        );
        assert_eq!(bound.by_name().get("flag1"), Some(&ArgValue::Flag(true)));
        assert_eq!(bound.by_name().get("flag2"), Some(&ArgValue::Flag(false)));
        assert_eq!(
            bound.by_name().get("opt2"),
            Some(&ArgValue::Text("hello".into()))
        );
    }

    #[test]
    fn flattened_map_has_one_entry_per_declared_parameter() {
        let command = echo_command();
        let bound = bind(&command, &tokens(&["v"])).expect("bind");
        assert_eq!(bound.by_name().len(), 6);
        for name in ["param1", "param2", "opt1", "opt2", "flag1", "flag2"] {
            assert!(bound.by_name().contains_key(name), "missing {name}");
        }
    }

    #[test]
    fn unbound_option_without_default_becomes_empty_string() {
        let command = echo_command();
        let bound = bind(&command, &tokens(&["v"])).expect("bind");
        assert_eq!(bound.by_name().get("opt1"), Some(&ArgValue::Text("".into())));
        let opt1 = bound.options().get("opt1").expect("opt1");
        assert!(opt1.is_default());
    }

    #[test]
    fn unknown_flag_fails() {
        let command = echo_command();
        let error = bind(&command, &tokens(&["v", "--bogus"])).expect_err("unknown flag");
        assert!(matches!(error, CommandError::InvalidFlag { flag } if flag == "bogus"));
    }

    #[test]
    fn repeated_flag_is_a_duplicate() {
        let command = echo_command();
        let error =
            bind(&command, &tokens(&["v", "--flag1", "--flag1"])).expect_err("duplicate flag");
        assert!(matches!(
            error,
            CommandError::DuplicateArgument { parameter } if parameter == "flag1"
        ));
    }

    #[test]
    fn repeated_option_reports_as_unrecognized() {
        let command = echo_command();
        let error = bind(&command, &tokens(&["v", "-opt1", "a", "-opt1", "b"]))
            .expect_err("duplicate option");
        assert!(matches!(
            error,
            CommandError::UnrecognizedOption { option } if option == "opt1"
        ));
    }

    #[test]
    fn unknown_option_fails() {
        let command = echo_command();
        let error = bind(&command, &tokens(&["v", "-bogus", "x"])).expect_err("unknown option");
        assert!(matches!(
            error,
            CommandError::UnrecognizedOption { option } if option == "bogus"
        ));
    }

    #[test]
    fn option_without_value_fails() {
        let command = echo_command();
        let error = bind(&command, &tokens(&["v", "-opt1"])).expect_err("no value");
        assert!(matches!(
            error,
            CommandError::DuplicateArgument { parameter } if parameter == "opt1"
        ));
    }

    #[test]
    fn leftover_tokens_without_declared_options_fail_plainly() {
        let command = positional_only();
        let error = bind(&command, &tokens(&["x", "y"])).expect_err("leftovers");
        assert!(matches!(error, CommandError::TooManyArguments { .. }));
        assert_eq!(error.to_string(), "Too many arguments");
    }

    #[test]
    fn bare_token_in_option_phase_lists_the_remaining_tokens() {
        let command = echo_command();
        let error = bind(&command, &tokens(&["v", "w", "stray", "more"])).expect_err("stray");
        assert!(matches!(error, CommandError::TooManyArguments { .. }));
        // The stray token is consumed; the message lists what follows it.
        assert_eq!(error.to_string(), r#"Too many arguments ["more"]"#);
    }

    #[test]
    fn quoted_literal_joins_tokens_with_spaces() {
        let command = positional_only();
        let bound = bind(&command, &tokens(&["\"a", "b", "c\""])).expect("bind");
        assert_eq!(
            bound.by_name().get("param1"),
            Some(&ArgValue::Text("a b c".into()))
        );
    }

    #[test]
    fn quote_not_at_position_zero_is_plain_text() {
        let command = positional_only();
        let bound = bind(&command, &tokens(&["john's"])).expect("bind");
        assert_eq!(
            bound.by_name().get("param1"),
            Some(&ArgValue::Text("john's".into()))
        );
    }

    #[test]
    fn single_token_literal_strips_both_quotes() {
        let command = positional_only();
        let bound = bind(&command, &tokens(&["'hello'"])).expect("bind");
        assert_eq!(
            bound.by_name().get("param1"),
            Some(&ArgValue::Text("hello".into()))
        );
    }

    #[test]
    fn literal_keeps_other_quote_characters_as_plain_text() {
        let command = positional_only();
        let bound = bind(&command, &tokens(&["`it's", "a", "\"test\"`"])).expect("bind");
        assert_eq!(
            bound.by_name().get("param1"),
            Some(&ArgValue::Text("it's a \"test\"".into()))
        );
    }

    #[test]
    fn quoted_option_value_spans_tokens() {
        let command = echo_command();
        let bound =
            bind(&command, &tokens(&["v", "w", "-opt1", "'x", "y'"])).expect("bind");
        assert_eq!(
            bound.by_name().get("opt1"),
            Some(&ArgValue::Text("x y".into()))
        );
    }

    #[test]
    fn empty_positional_token_binds_the_default() {
        let command = echo_command();
        let bound = bind(&command, &tokens(&["", "y"])).expect("bind");
        assert!(bound.params()[0].is_default());
        assert_eq!(bound.by_name().get("param1"), Some(&ArgValue::Text("".into())));
        assert_eq!(bound.params()[1].value(), &ArgValue::Text("y".into()));
    }
}
