//! Error types for CompanyScout.
//!
//! Library crates use [`ResearchError`] via `thiserror`.
//! App crates (cli/tui) wrap this with `color-eyre` for rich diagnostics.
//!
//! The stage variants ([`ResearchError::Lookup`], [`ResearchError::Fetch`],
//! [`ResearchError::Storage`]) and [`ResearchError::Validation`] display as
//! their bare message, because the pipeline hands that message to the user
//! unchanged.

use std::path::PathBuf;

/// Top-level error type for all CompanyScout operations.
#[derive(Debug, thiserror::Error)]
pub enum ResearchError {
    /// Configuration loading or validation error (missing API keys, bad TOML).
    #[error("config error: {message}")]
    Config { message: String },

    /// Input rejected before any stage ran.
    #[error("{message}")]
    Validation { message: String },

    /// Search lookup failed (no results, provider error, missing key).
    #[error("{0}")]
    Lookup(String),

    /// Network/HTTP error while fetching the company page.
    #[error("{0}")]
    Fetch(String),

    /// LLM completion error. Never escapes the summarize stage.
    #[error("completion error: {0}")]
    Completion(String),

    /// Database or storage layer error.
    #[error("{0}")]
    Storage(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ResearchError>;

impl ResearchError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = ResearchError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = ResearchError::Completion("rate limited".into());
        assert_eq!(err.to_string(), "completion error: rate limited");
    }

    #[test]
    fn stage_errors_display_bare_message() {
        let err = ResearchError::Lookup("No results found for: Acme".into());
        assert_eq!(err.to_string(), "No results found for: Acme");

        let err = ResearchError::Fetch("https://acme.com/: HTTP 404 Not Found".into());
        assert!(err.to_string().starts_with("https://acme.com/"));

        let err = ResearchError::validation("Please enter a company name");
        assert_eq!(err.to_string(), "Please enter a company name");
    }
}
