//! Corpus batch runner
//!
//! Every input is handled as its own unit of work: load, wrap in a fresh
//! single-document corpus, execute the pipeline, serialize, release. A
//! failure anywhere in that sequence is logged with the document's identity
//! and the batch moves on to the next input.

use crate::error::CliResult;
use crate::output::{write_output, DocumentFormatter};
use crate::progress::ProgressReporter;
use anyhow::Context;
use gloss_core::{Corpus, Document};
use gloss_engine::{DocumentLoader, Pipeline};
use std::path::{Path, PathBuf};

/// Outcome counts of a batch run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    /// Documents written successfully
    pub processed: usize,
    /// Documents that failed to load, execute or serialize
    pub failed: usize,
}

impl BatchSummary {
    /// Documents attempted
    pub fn total(&self) -> usize {
        self.processed + self.failed
    }

    /// True when no document failed
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Runs one pipeline over many documents
///
/// The runner owns the pipeline; dropping it releases every stage and model.
pub struct BatchRunner {
    pipeline: Pipeline,
    loader: DocumentLoader,
    formatter: Box<dyn DocumentFormatter>,
    output_dir: PathBuf,
    verbose: bool,
}

impl BatchRunner {
    /// Create a runner writing into `output_dir`
    pub fn new(
        pipeline: Pipeline,
        loader: DocumentLoader,
        formatter: Box<dyn DocumentFormatter>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            pipeline,
            loader,
            formatter,
            output_dir: output_dir.into(),
            verbose: false,
        }
    }

    /// Print the produced annotation types of every document
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// The pipeline in use
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Process `sources` in order; never stops early
    pub fn run(&self, sources: &[String], progress: &mut ProgressReporter) -> BatchSummary {
        let mut summary = BatchSummary::default();
        progress.init_documents(sources.len() as u64);

        for source in sources {
            match self.process(source, progress) {
                Ok(output) => {
                    summary.processed += 1;
                    log::info!("{source}: wrote {}", output.display());
                }
                Err(e) => {
                    summary.failed += 1;
                    log::error!("{source}: {e:#}");
                }
            }
            progress.document_completed(source);
        }

        progress.finish(summary.failed);
        log::info!(
            "batch finished: {} processed, {} failed",
            summary.processed,
            summary.failed
        );
        summary
    }

    /// Full lifecycle of one document
    pub fn process(&self, source: &str, progress: &ProgressReporter) -> CliResult<PathBuf> {
        let path = DocumentLoader::resolve_source(source)?;
        let document = self.loader.load_path(&path)?;
        log::debug!("{source}: loaded {} characters", document.char_len());

        let mut corpus = Corpus::single(document);
        for result in self.pipeline.execute_corpus(&mut corpus) {
            let report = result?;
            log::debug!(
                "{source}: {} annotations in {:?}",
                report.produced(),
                report.elapsed
            );
        }

        let mut written = None;
        for document in &corpus {
            if self.verbose {
                progress.println(&type_summary(document));
            }
            written = Some(self.write(&path, document)?);
        }
        written.with_context(|| format!("no document produced for {source}"))
    }

    fn write(&self, input: &Path, document: &Document) -> CliResult<PathBuf> {
        write_output(&self.output_dir, input, document, self.formatter.as_ref())
    }
}

/// `<id>: Found annotations of the following types: [A, B]`
pub fn type_summary(document: &Document) -> String {
    let types: Vec<String> = document
        .annotation_summary()
        .keys()
        .map(ToString::to_string)
        .collect();
    format!(
        "{}: Found annotations of the following types: [{}]",
        document.id(),
        types.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use gloss_engine::PipelineConfig;
    use std::fs;
    use tempfile::TempDir;

    fn runner(output: &Path) -> BatchRunner {
        let pipeline = Pipeline::standard(&PipelineConfig::default()).unwrap();
        BatchRunner::new(
            pipeline,
            DocumentLoader::default(),
            OutputFormat::Xml.formatter(true),
            output,
        )
    }

    #[test]
    fn test_failed_document_does_not_stop_batch() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        fs::write(input.path().join("1.txt"), "John Smith works at Acme Corp.").unwrap();
        fs::write(input.path().join("2.txt"), [0x66, 0x6f, 0xff, 0xfe]).unwrap();
        fs::write(input.path().join("3.txt"), "IBM hired staff.").unwrap();

        let sources: Vec<String> = ["1.txt", "2.txt", "3.txt"]
            .iter()
            .map(|n| input.path().join(n).display().to_string())
            .collect();

        let summary = runner(output.path()).run(&sources, &mut ProgressReporter::hidden());
        assert_eq!(summary, BatchSummary { processed: 2, failed: 1 });
        assert!(!summary.is_success());

        assert!(output.path().join("1.xml").exists());
        assert!(!output.path().join("2.xml").exists());
        assert!(output.path().join("3.xml").exists());
    }

    #[test]
    fn test_missing_and_unsupported_sources_fail() {
        let output = TempDir::new().unwrap();
        let runner = runner(output.path());
        let progress = ProgressReporter::hidden();

        assert!(runner.process("/no/such/file.txt", &progress).is_err());
        let err = runner.process("http://example.com/a.txt", &progress).unwrap_err();
        assert!(err.to_string().contains("unsupported"));
    }

    #[test]
    fn test_type_summary() {
        let mut doc = Document::new("a.txt", "Hi");
        doc.annotate(gloss_core::AnnotationType::Token, 0, 2, gloss_core::features! {})
            .unwrap();
        assert_eq!(
            type_summary(&doc),
            "a.txt: Found annotations of the following types: [Token]"
        );
    }
}
