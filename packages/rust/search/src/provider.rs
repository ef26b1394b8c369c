//! Search provider trait definition.

use std::future::Future;

use companyscout_shared::Result;

/// One organic search result. Only the link drives selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// Result URL. Empty when the provider omitted it.
    pub link: String,
    /// Result title, kept for logging.
    pub title: Option<String>,
}

impl SearchHit {
    pub fn new(link: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            title: None,
        }
    }
}

/// Trait for implementing web search providers.
///
/// Implementations return organic results in ranking order and report
/// failures as [`companyscout_shared::ResearchError::Lookup`].
pub trait SearchProvider: Send + Sync {
    /// Run one query, asking for at most `num_results` organic results.
    fn search(
        &self,
        query: &str,
        num_results: u32,
    ) -> impl Future<Output = Result<Vec<SearchHit>>> + Send;

    /// Provider name for logging.
    fn name(&self) -> &'static str;

    /// Whether the provider is usable (has an API key, etc.).
    fn is_available(&self) -> bool;
}
