use std::io::Write;
use std::process::ExitCode;

use clap::Parser;

use conch_cli::ConsoleArgs;

fn main() -> ExitCode {
    let args = ConsoleArgs::parse();
    match conch_cli::run(&args) {
        Ok(reply) => {
            if reply.is_error {
                let _ = std::io::stderr().write_all(reply.text.as_bytes());
                ExitCode::FAILURE
            } else {
                let _ = std::io::stdout().write_all(reply.text.as_bytes());
                ExitCode::SUCCESS
            }
        }
        Err(error) => {
            eprintln!("conch: {error}");
            ExitCode::FAILURE
        }
    }
}
