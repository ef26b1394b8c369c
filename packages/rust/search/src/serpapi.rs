//! SerpApi search provider.
//!
//! Issues a single `GET /search.json` per query and reads the
//! `organic_results[].link` field of the response.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use companyscout_shared::{ResearchError, Result, SearchConfig};

use crate::provider::{SearchHit, SearchProvider};

/// Default timeout in seconds for search API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// SerpApi-backed [`SearchProvider`].
pub struct SerpApiProvider {
    client: Client,
    endpoint: String,
    engine: String,
    api_key: String,
    /// Env var the key came from, for error messages.
    api_key_env: String,
}

impl SerpApiProvider {
    /// Create a provider from the `[search]` config and a resolved API key.
    pub fn new(config: &SearchConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ResearchError::Lookup(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            engine: config.engine.clone(),
            api_key: api_key.into(),
            api_key_env: config.api_key_env.clone(),
        })
    }
}

impl SearchProvider for SerpApiProvider {
    async fn search(&self, query: &str, num_results: u32) -> Result<Vec<SearchHit>> {
        if !self.is_available() {
            return Err(ResearchError::Lookup(format!(
                "{} not found in environment variables",
                self.api_key_env
            )));
        }

        debug!(query, num_results, engine = %self.engine, "querying SerpApi");

        let num = num_results.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("engine", self.engine.as_str()),
                ("q", query),
                ("api_key", self.api_key.as_str()),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ResearchError::Lookup(format!("search request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body: SerpResponse = response.json().await.unwrap_or_default();
            let detail = body.error.unwrap_or_else(|| "no details".into());
            warn!(%status, %detail, "SerpApi returned an error status");
            return Err(ResearchError::Lookup(format!(
                "search provider returned HTTP {status}: {detail}"
            )));
        }

        let body: SerpResponse = response
            .json()
            .await
            .map_err(|e| ResearchError::Lookup(format!("invalid search response: {e}")))?;

        if let Some(error) = &body.error {
            debug!(%error, "SerpApi reported an error alongside its results");
        }

        Ok(body
            .organic_results
            .into_iter()
            .map(|r| SearchHit {
                link: r.link,
                title: r.title,
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "serpapi"
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[derive(Debug, Default, Deserialize)]
struct SerpResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    link: String,
    #[serde(default)]
    title: Option<String>,
}
