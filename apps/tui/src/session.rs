//! Blocking bridge between the synchronous event loop and the async pipeline.

use std::path::PathBuf;

use color_eyre::eyre::Result;
use companyscout_core::{History, Researcher, SilentProgress, load_history};
use companyscout_shared::{
    ExtractionOutcome, PipelineConfig, database_path, load_config, missing_api_keys,
};
use tokio::runtime::Runtime;
use tracing::{info, warn};

/// Runtime plus the resolved pipeline for one TUI process.
pub(crate) struct Session {
    runtime: Runtime,
    /// `None` when required API keys are missing.
    researcher: Option<Researcher>,
    missing_keys: Vec<String>,
    database_path: PathBuf,
}

impl Session {
    /// Load config and environment, and build the pipeline if both keys are set.
    pub(crate) fn start() -> Result<Self> {
        let runtime = Runtime::new()?;
        let config = load_config()?;
        let database_path = database_path(&config)?;
        let missing_keys = missing_api_keys(&config);

        let researcher = if missing_keys.is_empty() {
            Some(Researcher::from_config(PipelineConfig::resolve(&config)?)?)
        } else {
            warn!(missing = ?missing_keys, "pipeline disabled until keys are set");
            None
        };

        info!(db = %database_path.display(), "tui session started");

        Ok(Self {
            runtime,
            researcher,
            missing_keys,
            database_path,
        })
    }

    pub(crate) fn missing_keys(&self) -> &[String] {
        &self.missing_keys
    }

    /// Run the pipeline to completion, blocking the caller.
    pub(crate) fn extract(&self, company_name: &str) -> ExtractionOutcome {
        match &self.researcher {
            Some(researcher) => self
                .runtime
                .block_on(researcher.extract_company_data(company_name, &SilentProgress)),
            None => ExtractionOutcome::Failure {
                stage: None,
                error: format!(
                    "missing required environment variables: {}",
                    self.missing_keys.join(", ")
                ),
            },
        }
    }

    /// Newest `limit` stored rows (all when `None`) plus the total.
    pub(crate) fn history(&self, limit: Option<u32>) -> companyscout_shared::Result<History> {
        self.runtime
            .block_on(load_history(&self.database_path, limit))
    }
}
