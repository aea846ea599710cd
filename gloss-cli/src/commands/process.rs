//! Batch annotation command

use crate::batch::{BatchRunner, BatchSummary};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::input::InputSource;
use crate::output::OutputFormat;
use crate::progress::ProgressReporter;
use anyhow::Context;
use clap::Args;
use gloss_engine::{DocumentLoader, Pipeline, PipelineConfig};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Arguments of a batch run
#[derive(Debug, Args)]
pub struct ProcessArgs {
    /// Directory of plain-text documents
    #[arg(
        short,
        long,
        value_name = "DIR",
        env = "GLOSS_INPUT_DIR",
        required_unless_present = "input_file"
    )]
    pub input_dir: Option<PathBuf>,

    /// Single document, as a path or file:// URL
    #[arg(short = 'u', long, value_name = "FILE/URL")]
    pub input_file: Option<String>,

    /// Directory receiving one output file per document
    #[arg(short, long, value_name = "DIR", required = true)]
    pub output_dir: PathBuf,

    /// Directory holding the parser model artifacts
    #[arg(short, long, value_name = "DIR", env = "GLOSS_MODELS_PATH")]
    pub models_path: Option<PathBuf>,

    /// Leave out dependency parsing and its models
    #[arg(short, long)]
    pub disable_parser: bool,

    /// Per-document annotation summary; repeat for more log output
    #[arg(short = 'v', long = "verbosity", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress and log output
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format [default: xml]
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// File name pattern in directory mode
    #[arg(long, default_value = "*")]
    pub pattern: String,

    /// Input text encoding
    #[arg(long, default_value = "utf-8")]
    pub encoding: String,

    /// Configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl ProcessArgs {
    /// Execute the batch
    ///
    /// Errors are fatal startup problems; per-document failures are only
    /// counted in the returned summary.
    pub fn execute(&self) -> CliResult<BatchSummary> {
        self.init_logging();

        log::info!("Starting batch annotation");
        log::debug!("Arguments: {:?}", self);

        let file_config = match &self.config {
            Some(path) => CliConfig::load(path)?,
            None => CliConfig::default(),
        };

        let pipeline_config = self.pipeline_config(&file_config)?;
        let sources = self.input_source()?.sources()?;
        if sources.is_empty() {
            log::warn!("no input documents found");
        }

        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("Failed to create output directory: {}", self.output_dir.display())
        })?;

        let loader = DocumentLoader::new(&self.encoding)?;
        let format = self.format.or(file_config.output.format).unwrap_or_default();
        let pipeline = Pipeline::standard(&pipeline_config)?;

        let runner = BatchRunner::new(
            pipeline,
            loader,
            format.formatter(file_config.output.pretty),
            &self.output_dir,
        )
        .verbose(self.verbose > 0);

        let mut progress = ProgressReporter::new(self.quiet);
        Ok(runner.run(&sources, &mut progress))
    }

    /// Where documents come from; a single file wins over a directory
    pub fn input_source(&self) -> CliResult<InputSource> {
        match (&self.input_file, &self.input_dir) {
            (Some(file), _) => Ok(InputSource::Single(file.clone())),
            (None, Some(dir)) => Ok(InputSource::Directory {
                dir: dir.clone(),
                pattern: self.pattern.clone(),
            }),
            (None, None) => Err(CliError::MissingOption("--input-dir".into()).into()),
        }
    }

    /// Merge flags over file values over defaults
    pub fn pipeline_config(&self, file: &CliConfig) -> CliResult<PipelineConfig> {
        let disable_parser =
            self.disable_parser || file.pipeline.disable_parser.unwrap_or(false);
        let models_path = self.models_path.clone().or_else(|| file.models.path.clone());
        if !disable_parser && models_path.is_none() {
            return Err(CliError::MissingOption(
                "--models-path (or --disable-parser)".into(),
            )
            .into());
        }

        let mut builder = PipelineConfig::builder()
            .enable_parser(!disable_parser)
            .models_path(models_path)
            .model_files(file.models.files())
            .gazetteer_lists(file.pipeline.gazetteer.clone())
            .check_invariants(file.pipeline.check_invariants)
            .stage_timeout(file.pipeline.stage_timeout_ms.map(Duration::from_millis));
        if let Some(keep) = &file.pipeline.keep_sets {
            builder = builder.keep_sets(keep.iter().cloned());
        }

        Ok(builder.build()?)
    }

    /// Initialize logging based on verbosity level
    fn init_logging(&self) {
        let log_level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        if !self.quiet {
            // a second initialisation in the same process keeps the first logger
            let _ = env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or(log_level),
            )
            .try_init();
        }
    }
}
