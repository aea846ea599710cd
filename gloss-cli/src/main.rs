//! gloss command-line entry point
//!
//! Exit status: 0 when every document was written, 1 when at least one
//! document failed, 2 on usage errors and fatal startup failures.

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use gloss_cli::commands::Cli;
use gloss_cli::CliError;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.process.execute() {
        Ok(summary) if summary.is_success() => ExitCode::SUCCESS,
        Ok(summary) => {
            eprintln!(
                "{} of {} documents failed",
                summary.failed,
                summary.total()
            );
            ExitCode::from(1)
        }
        Err(e) => {
            if let Some(error) = e.downcast_ref::<CliError>().filter(|e| e.is_usage()) {
                let kind = match error {
                    CliError::MissingOption(_) => ErrorKind::MissingRequiredArgument,
                    _ => ErrorKind::InvalidValue,
                };
                Cli::command().error(kind, error).exit();
            }
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}
