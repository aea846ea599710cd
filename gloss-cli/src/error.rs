//! Error handling for the CLI application

use std::fmt;

/// Errors specific to the command-line surface
#[derive(Debug)]
pub enum CliError {
    /// A required option was not given on the command line or in the config file
    MissingOption(String),
    /// Invalid file pattern
    InvalidPattern(String),
    /// Configuration file could not be used
    ConfigError(String),
    /// Nothing to process
    NoInput(String),
}

impl CliError {
    /// Whether the error is a usage problem rather than a runtime failure
    pub fn is_usage(&self) -> bool {
        matches!(self, CliError::MissingOption(_) | CliError::InvalidPattern(_))
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::MissingOption(option) => write!(f, "Missing required option: {option}"),
            CliError::InvalidPattern(pattern) => write!(f, "Invalid file pattern: {pattern}"),
            CliError::ConfigError(msg) => write!(f, "Configuration error: {msg}"),
            CliError::NoInput(msg) => write!(f, "No input: {msg}"),
        }
    }
}

impl std::error::Error for CliError {}

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, anyhow::Error>;
