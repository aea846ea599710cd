//! Command-line surface

use clap::Parser;

pub mod process;

pub use process::ProcessArgs;

/// Annotate a directory of plain-text documents
#[derive(Debug, Parser)]
#[command(name = "gloss", version, about, long_about = None)]
pub struct Cli {
    /// Processing options
    #[command(flatten)]
    pub process: ProcessArgs,
}
