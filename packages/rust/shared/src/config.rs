//! Application configuration for CompanyScout.
//!
//! User config lives at `~/.companyscout/companyscout.toml`.
//! CLI flags override config file values, which override defaults.
//! API keys are never stored in the file; each provider section names the
//! environment variable that holds its key.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ResearchError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "companyscout.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".companyscout";

/// Default database file name inside the config directory.
const DATABASE_FILE_NAME: &str = "company_data.db";

// ---------------------------------------------------------------------------
// Config structs (matching companyscout.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Search provider settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Page fetch settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// LLM provider settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Bounded retry policy applied to a single pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt (total attempts = `max_retries + 1`).
    #[serde(default)]
    pub max_retries: u32,

    /// Fixed delay between attempts, in seconds.
    #[serde(default)]
    pub delay_secs: u64,
}

impl RetryPolicy {
    /// A policy that never retries.
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            delay_secs: 0,
        }
    }

    /// Total number of attempts this policy allows.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay between attempts.
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Name of the env var holding the search API key.
    #[serde(default = "default_search_key_env")]
    pub api_key_env: String,

    /// Search API endpoint.
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    /// Search engine identifier passed to the provider.
    #[serde(default = "default_search_engine")]
    pub engine: String,

    /// Number of organic results to request.
    #[serde(default = "default_num_results")]
    pub num_results: u32,

    /// Hosts never accepted as the company domain (substring match).
    #[serde(default = "default_deny_hosts")]
    pub deny_hosts: Vec<String>,

    /// Substring that identifies a professional-network company profile link.
    #[serde(default = "default_profile_marker")]
    pub profile_marker: String,

    /// Retry policy for the lookup stage.
    #[serde(default = "default_search_retry")]
    pub retry: RetryPolicy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_search_key_env(),
            endpoint: default_search_endpoint(),
            engine: default_search_engine(),
            num_results: default_num_results(),
            deny_hosts: default_deny_hosts(),
            profile_marker: default_profile_marker(),
            retry: default_search_retry(),
        }
    }
}

fn default_search_key_env() -> String {
    "SERP_API_KEY".into()
}
fn default_search_endpoint() -> String {
    "https://serpapi.com/search.json".into()
}
fn default_search_engine() -> String {
    "google".into()
}
fn default_num_results() -> u32 {
    5
}
fn default_deny_hosts() -> Vec<String> {
    vec![
        "wikipedia.org".into(),
        "facebook.com".into(),
        "twitter.com".into(),
    ]
}
fn default_profile_marker() -> String {
    "linkedin.com/company/".into()
}
fn default_search_retry() -> RetryPolicy {
    RetryPolicy {
        max_retries: 2,
        delay_secs: 2,
    }
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header sent with every page request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,

    /// Retry policy for the fetch stage.
    #[serde(default = "default_fetch_retry")]
    pub retry: RetryPolicy,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_fetch_timeout(),
            retry: default_fetch_retry(),
        }
    }
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into()
}
fn default_fetch_timeout() -> u64 {
    15
}
fn default_fetch_retry() -> RetryPolicy {
    RetryPolicy {
        max_retries: 2,
        delay_secs: 0,
    }
}

/// `[llm]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Name of the env var holding the LLM API key.
    #[serde(default = "default_llm_key_env")]
    pub api_key_env: String,

    /// Base URL of an OpenAI-compatible API.
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    /// Chat model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Upper bound on completion tokens.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds.
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_llm_key_env(),
            endpoint: default_llm_endpoint(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

fn default_llm_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_llm_endpoint() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f64 {
    0.1
}
fn default_max_tokens() -> u32 {
    300
}
fn default_llm_timeout() -> u64 {
    60
}

/// `[storage]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database file path. Defaults to `~/.companyscout/company_data.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<String>,
}

// ---------------------------------------------------------------------------
// Pipeline config (runtime, resolved once at start-up)
// ---------------------------------------------------------------------------

/// Runtime configuration threaded through every pipeline stage.
///
/// Built once from the [`AppConfig`] plus the process environment. Holding one
/// means both API keys were present at start-up.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub search: SearchConfig,
    pub fetch: FetchConfig,
    pub llm: LlmConfig,
    /// Resolved search API key.
    pub search_api_key: String,
    /// Resolved LLM API key.
    pub llm_api_key: String,
    /// Resolved database file path.
    pub database_path: PathBuf,
}

impl PipelineConfig {
    /// Resolve keys from the environment and the database path from config.
    ///
    /// Fails with [`ResearchError::Config`] naming every missing variable.
    pub fn resolve(config: &AppConfig) -> Result<Self> {
        let missing = missing_api_keys(config);
        if !missing.is_empty() {
            return Err(ResearchError::config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            search: config.search.clone(),
            fetch: config.fetch.clone(),
            llm: config.llm.clone(),
            search_api_key: read_env(&config.search.api_key_env).unwrap_or_default(),
            llm_api_key: read_env(&config.llm.api_key_env).unwrap_or_default(),
            database_path: database_path(config)?,
        })
    }

    /// Override the database path (e.g. from a `--db` flag).
    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = path.into();
        self
    }
}

fn read_env(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => Some(val),
        _ => None,
    }
}

/// Names of the required API key env vars that are unset or empty.
pub fn missing_api_keys(config: &AppConfig) -> Vec<String> {
    [&config.search.api_key_env, &config.llm.api_key_env]
        .into_iter()
        .filter(|name| read_env(name).is_none())
        .cloned()
        .collect()
}

/// Resolve the database file path from config, falling back to the config dir.
pub fn database_path(config: &AppConfig) -> Result<PathBuf> {
    match &config.storage.database_path {
        Some(path) => Ok(PathBuf::from(path)),
        None => Ok(config_dir()?.join(DATABASE_FILE_NAME)),
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.companyscout/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| ResearchError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.companyscout/companyscout.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ResearchError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| ResearchError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ResearchError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ResearchError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ResearchError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
