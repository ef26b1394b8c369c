//! End-to-end research pipeline: name → lookup → fetch → summarize → persist.

use tracing::{Instrument, error, info, info_span};

use companyscout_crawler::Fetcher;
use companyscout_search::{LookupOptions, SearchProvider, SerpApiProvider, lookup};
use companyscout_shared::{
    ExtractionOutcome, ExtractionResult, PipelineConfig, ResearchError, Result, RunId, Stage,
};

use crate::completion::{CompletionClient, OpenAiClient};
use crate::persist::{History, load_history, persist};
use crate::retry::retry;
use crate::summarize::summarize;

/// Message returned when the company name is blank.
const EMPTY_NAME_MESSAGE: &str = "Please enter a company name";

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a stage.
    fn stage(&self, stage: Stage);
    /// Called once with the terminal outcome.
    fn done(&self, outcome: &ExtractionOutcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn stage(&self, _stage: Stage) {}
    fn done(&self, _outcome: &ExtractionOutcome) {}
}

// ---------------------------------------------------------------------------
// Researcher
// ---------------------------------------------------------------------------

/// Runs the research pipeline against a fixed set of collaborators.
pub struct Researcher<S = SerpApiProvider, C = OpenAiClient> {
    config: PipelineConfig,
    search: S,
    fetcher: Fetcher,
    completion: C,
}

impl Researcher {
    /// Build the production pipeline (SerpApi + OpenAI) from resolved config.
    pub fn from_config(config: PipelineConfig) -> Result<Self> {
        let search = SerpApiProvider::new(&config.search, config.search_api_key.clone())?;
        let fetcher = Fetcher::new(&config.fetch)?;
        let completion = OpenAiClient::new(&config.llm, config.llm_api_key.clone())?;
        Ok(Self::new(config, search, fetcher, completion))
    }
}

type StageError = (Option<Stage>, ResearchError);

impl<S: SearchProvider, C: CompletionClient> Researcher<S, C> {
    pub fn new(config: PipelineConfig, search: S, fetcher: Fetcher, completion: C) -> Self {
        Self {
            config,
            search,
            fetcher,
            completion,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Research one company and store the result.
    ///
    /// Never returns an error: every failure is reported as
    /// [`ExtractionOutcome::Failure`] carrying the failing stage.
    pub async fn extract_company_data(
        &self,
        company_name: &str,
        progress: &dyn ProgressReporter,
    ) -> ExtractionOutcome {
        let name = company_name.trim();
        let run_id = RunId::new();
        let span = info_span!("extract", company = %name, run_id = %run_id);

        let outcome = async {
            match self.run_stages(name, progress).await {
                Ok((data, id)) => {
                    info!(%id, "extraction completed");
                    ExtractionOutcome::Success { data, id }
                }
                Err((stage, e)) => {
                    error!(stage = stage.map(|s| s.as_str()), error = %e, "extraction failed");
                    ExtractionOutcome::Failure {
                        stage,
                        error: e.to_string(),
                    }
                }
            }
        }
        .instrument(span)
        .await;

        progress.done(&outcome);
        outcome
    }

    async fn run_stages(
        &self,
        name: &str,
        progress: &dyn ProgressReporter,
    ) -> std::result::Result<(ExtractionResult, String), StageError> {
        if name.is_empty() {
            return Err((None, ResearchError::validation(EMPTY_NAME_MESSAGE)));
        }

        // --- Lookup ---
        progress.stage(Stage::Lookup);
        let opts = LookupOptions::from(&self.config.search);
        let found = retry(self.config.search.retry, Stage::Lookup, || {
            lookup(&self.search, name, &opts)
        })
        .await
        .map_err(|e| (Some(Stage::Lookup), e))?;

        // --- Fetch ---
        progress.stage(Stage::Fetch);
        let doc = retry(self.config.fetch.retry, Stage::Fetch, || {
            self.fetcher.fetch(&found.domain)
        })
        .await
        .map_err(|e| (Some(Stage::Fetch), e))?;

        // --- Summarize ---
        progress.stage(Stage::Summarize);
        let analysis = summarize(&self.completion, &self.config.llm, name, &doc).await;

        let data = ExtractionResult {
            company_name: found.company_name,
            domain: found.domain,
            linkedin_url: found.linkedin_url,
            analysis: analysis.into_text(),
        };

        // --- Persist ---
        progress.stage(Stage::Persist);
        let id = persist(&self.config.database_path, &data)
            .await
            .map_err(|e| (Some(Stage::Persist), e))?;

        Ok((data, id))
    }

    /// Newest stored rows plus the total count.
    pub async fn history(&self, limit: Option<u32>) -> Result<History> {
        load_history(&self.config.database_path, limit).await
    }
}
