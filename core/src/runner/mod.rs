mod dump;

pub use dump::{DumpSummary, Extractor, FileDumper, Geometry};

use crate::config::ExtractConfig;
use crate::error::ExtractError;

/// The single blocking unit of work. Consumed by running it.
pub trait Runner {
    fn run(self: Box<Self>) -> Result<(), ExtractError>;
}

/// Runs one extraction against an [`Extractor`].
pub struct DumpRunner<E = FileDumper> {
    config: ExtractConfig,
    extractor: E,
}

impl DumpRunner<FileDumper> {
    pub fn new(config: ExtractConfig) -> Self {
        Self::with_extractor(config, FileDumper)
    }
}

impl<E: Extractor> DumpRunner<E> {
    pub fn with_extractor(config: ExtractConfig, extractor: E) -> Self {
        Self { config, extractor }
    }
}

impl<E: Extractor> Runner for DumpRunner<E> {
    fn run(self: Box<Self>) -> Result<(), ExtractError> {
        tracing::info!(
            input = %self.config.input_path().display(),
            output = %self.config.output_path().display(),
            "extracting"
        );
        match serde_json::to_string(&self.config) {
            Ok(json) => tracing::debug!(config = %json, "resolved configuration"),
            Err(e) => tracing::debug!("configuration not serializable: {}", e),
        }

        let summary = self.extractor.dumpfile(&self.config)?;

        match serde_json::to_string(&summary) {
            Ok(json) => tracing::info!(summary = %json, "extraction finished"),
            Err(_) => tracing::info!(blocks = summary.blocks, "extraction finished"),
        }
        Ok(())
    }
}
