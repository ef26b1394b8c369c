//! libSQL storage for research results.
//!
//! The [`Storage`] struct wraps a local libSQL database holding one
//! `companies` table. Callers open a handle per operation and drop it when
//! done; the file itself is the only shared state.

mod migrations;

use std::path::Path;

use chrono::Utc;
use companyscout_shared::{CompanyRecord, ExtractionResult, ResearchError, Result};
use libsql::{Connection, Database, params};

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
}

impl Storage {
    /// Open or create a database at `path`, applying pending migrations.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ResearchError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| ResearchError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| ResearchError::Storage(e.to_string()))?;

        let storage = Self { db, conn };
        storage.run_migrations().await?;
        Ok(storage)
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn
                    .execute_batch(migration.sql)
                    .await
                    .map_err(|e| {
                        ResearchError::Storage(format!(
                            "migration v{} failed: {e}",
                            migration.version
                        ))
                    })?;
            }
        }
        Ok(())
    }

    /// Current schema version, or 0 on a fresh file.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => match rows.next().await {
                Ok(Some(row)) => row.get::<u32>(0).unwrap_or(0),
                _ => 0,
            },
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    // -----------------------------------------------------------------------
    // Company operations
    // -----------------------------------------------------------------------

    /// Insert one research result stamped with the current time.
    ///
    /// Returns the new row id. Identical inputs always produce new rows.
    pub async fn insert_company(&self, result: &ExtractionResult) -> Result<i64> {
        let timestamp = Utc::now().timestamp_micros() as f64 / 1_000_000.0;

        self.conn
            .execute(
                "INSERT INTO companies (company_name, domain, linkedin_url, analysis, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    result.company_name.as_str(),
                    result.domain.as_str(),
                    result.linkedin_url.as_deref(),
                    result.analysis.as_str(),
                    timestamp
                ],
            )
            .await
            .map_err(|e| ResearchError::Storage(e.to_string()))?;

        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, company = %result.company_name, "company stored");
        Ok(id)
    }

    /// Stored rows, newest first. `None` returns every row.
    pub async fn list_companies(&self, limit: Option<u32>) -> Result<Vec<CompanyRecord>> {
        // SQLite treats a negative LIMIT as unbounded.
        let limit = limit.map_or(-1, i64::from);

        let mut rows = self
            .conn
            .query(
                "SELECT id, company_name, domain, linkedin_url, analysis, timestamp
                 FROM companies
                 ORDER BY timestamp DESC, id DESC
                 LIMIT ?1",
                params![limit],
            )
            .await
            .map_err(|e| ResearchError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| ResearchError::Storage(e.to_string()))?
        {
            results.push(row_to_record(&row)?);
        }
        Ok(results)
    }

    /// Number of stored rows.
    pub async fn count_companies(&self) -> Result<u64> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM companies", params![])
            .await
            .map_err(|e| ResearchError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => row
                .get::<i64>(0)
                .map(|n| n.max(0) as u64)
                .map_err(|e| ResearchError::Storage(e.to_string())),
            Ok(None) => Ok(0),
            Err(e) => Err(ResearchError::Storage(e.to_string())),
        }
    }
}

/// Convert a database row to a [`CompanyRecord`].
///
/// Text columns are nullable in the schema; NULL reads back as empty.
fn row_to_record(row: &libsql::Row) -> Result<CompanyRecord> {
    Ok(CompanyRecord {
        id: row
            .get::<i64>(0)
            .map_err(|e| ResearchError::Storage(e.to_string()))?,
        company_name: row.get::<String>(1).unwrap_or_default(),
        domain: row.get::<String>(2).unwrap_or_default(),
        linkedin_url: row.get::<String>(3).ok(),
        analysis: row.get::<String>(4).unwrap_or_default(),
        timestamp: row.get::<f64>(5).unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_db_path() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("cs_test_{}.db", Uuid::now_v7()))
    }

    async fn test_storage() -> Storage {
        Storage::open(&temp_db_path()).await.expect("open test db")
    }

    fn sample(name: &str, linkedin: Option<&str>) -> ExtractionResult {
        ExtractionResult {
            company_name: name.into(),
            domain: format!("https://{}.com", name.to_lowercase()),
            linkedin_url: linkedin.map(str::to_string),
            analysis: r#"{"cheapest_plan": "$10/mo"}"#.into(),
        }
    }

    #[tokio::test]
    async fn open_and_migrate() {
        let storage = test_storage().await;
        assert_eq!(storage.get_schema_version().await, 1);
        assert_eq!(storage.count_companies().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn idempotent_migration() {
        let tmp = temp_db_path();
        let s1 = Storage::open(&tmp).await.expect("first open");
        s1.insert_company(&sample("Acme", None)).await.unwrap();
        drop(s1);

        let s2 = Storage::open(&tmp).await.expect("second open");
        assert_eq!(s2.get_schema_version().await, 1);
        assert_eq!(s2.count_companies().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn creates_parent_directory() {
        let dir = std::env::temp_dir().join(format!("cs_dir_{}", Uuid::now_v7()));
        let path = dir.join("nested").join("company_data.db");
        let storage = Storage::open(&path).await.expect("open nested");
        storage.insert_company(&sample("Acme", None)).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn directory_path_is_a_storage_error() {
        let dir = std::env::temp_dir().join(format!("cs_isdir_{}", Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();

        let Err(err) = Storage::open(&dir).await else {
            panic!("opening a directory as a database should fail");
        };
        assert!(matches!(err, ResearchError::Storage(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn identical_inserts_get_distinct_ids() {
        let storage = test_storage().await;
        let result = sample("Acme", Some("https://www.linkedin.com/company/acme"));

        let first = storage.insert_company(&result).await.unwrap();
        let second = storage.insert_company(&result).await.unwrap();

        assert_eq!(first, 1);
        assert_ne!(first, second);
        assert_eq!(storage.count_companies().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn list_is_newest_first_and_limited() {
        let storage = test_storage().await;
        for name in ["Acme", "Globex", "Initech"] {
            storage.insert_company(&sample(name, None)).await.unwrap();
        }

        let all = storage.list_companies(None).await.unwrap();
        let names: Vec<&str> = all.iter().map(|r| r.company_name.as_str()).collect();
        assert_eq!(names, ["Initech", "Globex", "Acme"]);
        assert!(all[0].timestamp >= all[2].timestamp);

        let recent = storage.list_companies(Some(2)).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].company_name, "Initech");
    }

    #[tokio::test]
    async fn round_trips_optional_profile() {
        let storage = test_storage().await;
        storage.insert_company(&sample("Acme", None)).await.unwrap();
        storage
            .insert_company(&sample("Globex", Some("https://www.linkedin.com/company/globex")))
            .await
            .unwrap();

        let rows = storage.list_companies(None).await.unwrap();
        assert_eq!(
            rows[0].linkedin_url.as_deref(),
            Some("https://www.linkedin.com/company/globex")
        );
        assert!(rows[1].linkedin_url.is_none());
        assert_eq!(rows[1].domain, "https://acme.com");
        assert!(rows[1].stored_at().is_some());
    }
}
