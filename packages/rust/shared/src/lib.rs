//! Shared types, error model, and configuration for CompanyScout.
//!
//! This crate is the foundation depended on by all other CompanyScout crates.
//! It provides:
//! - [`ResearchError`], the unified error type
//! - Domain types ([`ExtractionResult`], [`CompanyRecord`], [`Analysis`], [`ExtractionOutcome`])
//! - Configuration ([`AppConfig`], [`PipelineConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, FetchConfig, LlmConfig, PipelineConfig, RetryPolicy, SearchConfig, StorageConfig,
    config_dir, config_file_path, database_path, init_config, load_config, load_config_from,
    missing_api_keys,
};
pub use error::{ResearchError, Result};
pub use types::{
    Analysis, CompanyRecord, ExtractionOutcome, ExtractionResult, RunId, Stage, pretty_analysis,
};
