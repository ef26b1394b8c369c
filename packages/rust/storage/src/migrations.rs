//! SQL migration definitions for the company database.
//!
//! Migrations are applied in order on database open. Each one records its
//! version in `schema_migrations` so re-opening an existing file is a no-op.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema: companies",
        sql: r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version    INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- One row per completed research run
CREATE TABLE IF NOT EXISTS companies (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    company_name TEXT,
    domain       TEXT,
    linkedin_url TEXT,
    analysis     TEXT,
    timestamp    REAL
);

CREATE INDEX IF NOT EXISTS idx_companies_timestamp ON companies(timestamp);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}
