//! Input enumeration

use crate::error::{CliError, CliResult};
use glob::{glob, Pattern};
use std::path::{Path, PathBuf};

/// Where the documents of a run come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Regular files of a directory whose names match a glob pattern
    Directory {
        /// Directory to scan, not recursively
        dir: PathBuf,
        /// File name pattern
        pattern: String,
    },
    /// One path or `file://` URL
    Single(String),
}

impl InputSource {
    /// Document sources in processing order
    pub fn sources(&self) -> CliResult<Vec<String>> {
        match self {
            InputSource::Directory { dir, pattern } => Ok(discover(dir, pattern)?
                .into_iter()
                .map(|path| path.display().to_string())
                .collect()),
            InputSource::Single(source) => Ok(vec![source.clone()]),
        }
    }
}

/// Regular files in `dir` matching `pattern`, sorted by path
pub fn discover(dir: &Path, pattern: &str) -> CliResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(CliError::NoInput(format!("{} is not a directory", dir.display())).into());
    }
    if pattern.contains('/') || pattern.contains(std::path::MAIN_SEPARATOR) {
        return Err(CliError::InvalidPattern(pattern.to_string()).into());
    }

    let full = format!(
        "{}/{}",
        Pattern::escape(&dir.to_string_lossy()),
        pattern
    );
    let paths = glob(&full).map_err(|_| CliError::InvalidPattern(pattern.to_string()))?;

    let mut files = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => log::warn!("skipping unreadable entry {}", e.path().display()),
        }
    }

    files.sort();
    files.dedup();
    log::info!("found {} input documents in {}", files.len(), dir.display());
    Ok(files)
}
