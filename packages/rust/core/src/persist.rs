//! Persist stage and the read path over stored results.

use std::path::Path;

use companyscout_shared::{CompanyRecord, ExtractionResult, Result};
use companyscout_storage::Storage;
use tracing::{info, instrument};

/// Store one result and return its row id as a string.
///
/// Opens the database for the duration of the call only.
#[instrument(skip_all, fields(db = %path.display(), company = %result.company_name))]
pub async fn persist(path: &Path, result: &ExtractionResult) -> Result<String> {
    let storage = Storage::open(path).await?;
    let id = storage.insert_company(result).await?;
    info!(id, "result stored");
    Ok(id.to_string())
}

/// A page of stored rows plus the table total.
#[derive(Debug, Clone, Default)]
pub struct History {
    /// Newest first.
    pub records: Vec<CompanyRecord>,
    pub total: u64,
}

/// Read the newest `limit` rows (all when `None`) and the row count.
pub async fn load_history(path: &Path, limit: Option<u32>) -> Result<History> {
    let storage = Storage::open(path).await?;
    let records = storage.list_companies(limit).await?;
    let total = storage.count_companies().await?;
    Ok(History { records, total })
}
