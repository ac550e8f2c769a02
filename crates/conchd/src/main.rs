use std::process::ExitCode;

use clap::Parser;

use conch_config::ConsoleConfig;

fn main() -> ExitCode {
    let config = ConsoleConfig::parse();
    match conchd::run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("conchd: {error}");
            ExitCode::FAILURE
        }
    }
}
