//! Progress reporting over a batch of documents

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress bar over documents, silent when quiet
pub struct ProgressReporter {
    progress_bar: Option<ProgressBar>,
    quiet: bool,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new(quiet: bool) -> Self {
        Self {
            progress_bar: None,
            quiet,
        }
    }

    /// Reporter that never draws
    pub fn hidden() -> Self {
        Self::new(true)
    }

    /// Start the bar for `total_documents`
    pub fn init_documents(&mut self, total_documents: u64) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new(total_documents);
        let style = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} documents {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-");
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(100));

        self.progress_bar = Some(pb);
    }

    /// One document finished, successfully or not
    pub fn document_completed(&self, document: &str) {
        if let Some(pb) = &self.progress_bar {
            pb.set_message(document.to_string());
            pb.inc(1);
        }
    }

    /// Print a line to stdout without tearing the bar
    pub fn println(&self, line: &str) {
        match &self.progress_bar {
            Some(pb) => pb.suspend(|| println!("{line}")),
            None => println!("{line}"),
        }
    }

    /// Finish progress reporting
    pub fn finish(&self, failed: usize) {
        if let Some(pb) = &self.progress_bar {
            if failed == 0 {
                pb.finish_with_message("done");
            } else {
                pb.abandon_with_message(format!("done, {failed} failed"));
            }
        }
    }
}
