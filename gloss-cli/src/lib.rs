//! gloss CLI library
//!
//! Batch driver around the gloss annotation pipeline: argument and
//! configuration handling, input discovery, per-document isolation,
//! serialization and progress reporting.

pub mod batch;
pub mod commands;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod progress;

pub use batch::{BatchRunner, BatchSummary};
pub use error::{CliError, CliResult};
