//! Command resolution and argument-binding engine for the conch console.
//!
//! A process registers a tree of dot-delimited, path-addressed commands
//! (for example `pool.worker.restart`) with typed argument slots, then
//! feeds flat token lists from a CLI invocation or a remote socket
//! through the [`Dispatcher`]. Resolution walks the longest known path
//! prefix, binding maps the leftover tokens onto positional, option, and
//! flag parameters with default fallback, and execution runs the command
//! body, returning a payload array or a structured [`CommandError`].
//!
//! The wire framing that carries queries between processes lives in the
//! `conchd` and `conch-cli` crates; this crate is transport agnostic.

mod binder;
mod command;
mod dispatcher;
mod errors;
mod parameter;
mod registry;
mod resolver;

pub use binder::{BoundArg, BoundArgs, bind};
pub use command::{
    ArgMap, Category, Command, CommandDefinition, CommandNode, CommandResult, Handler,
};
pub use dispatcher::{Dispatcher, ParsedQuery, Query};
pub use errors::{CommandError, DefineError};
pub use parameter::{ArgValue, ParamSpec, Parameter};
pub use registry::CommandSet;
pub use resolver::{ResolvedQuery, resolve};
