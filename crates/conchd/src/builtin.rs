//! Built-in `sys.*` diagnostic commands.
//!
//! Registered at startup so an operator can confirm the console answers
//! before any application commands exist.

use std::time::Instant;

use serde_json::{Value, json};

use conch_core::{ArgValue, CommandDefinition, DefineError, Dispatcher, ParamSpec};

/// Registers the diagnostic command set.
pub fn register(dispatcher: &mut Dispatcher, started: Instant) -> Result<(), DefineError> {
    dispatcher.define(
        CommandDefinition::new("sys.ping")
            .description("Check the console is responsive.")
            .handler(|_| Ok(vec![json!("pong")])),
    )?;

    dispatcher.define(
        CommandDefinition::new("sys.echo")
            .description("Echo the supplied text back to the caller.")
            .param(ParamSpec::described("text", "The text to echo."))
            .option(ParamSpec::with_default(
                "repeat",
                "1",
                "Number of copies to return.",
            ))
            .flag(ParamSpec::described("upper", "Return the text in upper case."))
            .handler(|args| {
                let text = text_arg(args, "text");
                let repeat = text_arg(args, "repeat").parse::<usize>().unwrap_or(1);
                let upper = args.get("upper") == Some(&ArgValue::Flag(true));
                let rendered = if upper { text.to_uppercase() } else { text };
                Ok(vec![Value::from(rendered); repeat.max(1)])
            }),
    )?;

    dispatcher.define(
        CommandDefinition::new("sys.uptime")
            .description("Report seconds since the daemon started.")
            .handler(move |_| Ok(vec![json!(started.elapsed().as_secs())])),
    )?;

    Ok(())
}

fn text_arg(args: &conch_core::ArgMap, name: &str) -> String {
    args.get(name)
        .and_then(ArgValue::as_text)
        .unwrap_or_default()
        .to_owned()
}
