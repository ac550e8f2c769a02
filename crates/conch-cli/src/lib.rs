//! Console client for a running `conchd` daemon.
//!
//! Connects to the configured endpoint, sends the query tokens as one
//! request line, and renders the reply frame for the terminal.

mod cli;
mod errors;
mod render;
mod transport;

pub use cli::ConsoleArgs;
pub use errors::AppError;
pub use render::Reply;

/// Executes one query against the console and returns the rendered reply.
pub fn run(args: &ConsoleArgs) -> Result<Reply, AppError> {
    let mut connection = transport::connect(&args.endpoint)?;
    let frame = transport::exchange(&mut connection, &args.query)?;
    Ok(render::reply(&frame))
}
