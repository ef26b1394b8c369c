//! Research pipeline orchestration for CompanyScout.
//!
//! This crate ties together lookup, fetch, summarize, and persist into the
//! single end-to-end workflow [`Researcher::extract_company_data`].

pub mod completion;
pub mod persist;
pub mod pipeline;
pub mod retry;
pub mod summarize;

pub use completion::{ChatMessage, CompletionClient, CompletionRequest, OpenAiClient};
pub use persist::{History, load_history, persist};
pub use pipeline::{ProgressReporter, Researcher, SilentProgress};
pub use retry::retry;
pub use summarize::{prepare_content, summarize};
