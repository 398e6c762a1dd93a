//! SQLite-backed catalog store
//!
//! One SQL table per catalog table. Every record attribute (including
//! `Variations`) lives in a JSON document column; predicates compile to
//! `json_extract` equality, so a scan behaves like a filtered table scan.

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

use super::{CatalogRecord, CatalogStore, Predicate};
use crate::{Error, Result};

/// Catalog store over a SQLite connection pool
#[derive(Clone)]
pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    /// Wrap an existing pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) the catalog database at `db_path`
    pub async fn open(db_path: &Path) -> Result<Self> {
        let newly_created = !db_path.exists();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect(&db_url)
            .await?;

        if newly_created {
            info!("Initialized new catalog database: {}", db_path.display());
        } else {
            info!("Opened existing catalog database: {}", db_path.display());
        }

        sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
        sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create a catalog table if it does not exist yet (idempotent)
    pub async fn create_table(&self, table: &str) -> Result<()> {
        let quoted = quote_table(table)?;
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id TEXT PRIMARY KEY,
                attributes TEXT NOT NULL,
                version INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT
            )
            "#,
            quoted
        ))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Insert a new record with a fresh id
    ///
    /// Used by administrative tooling and tests; the ingest path never
    /// creates records.
    pub async fn insert(&self, table: &str, attributes: Map<String, Value>) -> Result<CatalogRecord> {
        let quoted = quote_table(table)?;
        let record = CatalogRecord::from_document(Uuid::new_v4().to_string(), 0, attributes)?;
        let document = serde_json::to_string(&record.to_document())?;

        sqlx::query(&format!(
            "INSERT INTO {} (id, attributes, version, updated_at) VALUES (?, ?, 0, ?)",
            quoted
        ))
        .bind(&record.id)
        .bind(&document)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(record)
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalog {
    async fn scan(&self, table: &str, predicate: &Predicate) -> Result<Vec<CatalogRecord>> {
        let quoted = quote_table(table)?;

        let mut sql = format!("SELECT id, version, attributes FROM {}", quoted);
        for (i, _) in predicate.clauses().iter().enumerate() {
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            sql.push_str("json_extract(attributes, ?) = ?");
        }
        sql.push_str(" ORDER BY id");

        let mut query = sqlx::query_as::<_, (String, i64, String)>(&sql);
        for clause in predicate.clauses() {
            query = query
                .bind(format!("$.{}", clause.attribute))
                .bind(clause.value.as_str());
        }

        let rows = query.fetch_all(&self.pool).await?;
        debug!(table = %table, predicate = %predicate, matches = rows.len(), "Catalog scan");

        rows.into_iter()
            .map(|(id, version, attributes)| -> Result<CatalogRecord> {
                let document: Map<String, Value> = serde_json::from_str(&attributes)?;
                CatalogRecord::from_document(id, version, document)
            })
            .collect()
    }

    async fn put(&self, table: &str, record: &CatalogRecord) -> Result<i64> {
        let quoted = quote_table(table)?;
        let document = serde_json::to_string(&record.to_document())?;

        let result = sqlx::query(&format!(
            r#"
            INSERT INTO {t} (id, attributes, version, updated_at)
            VALUES (?1, ?2, ?3 + 1, ?4)
            ON CONFLICT(id) DO UPDATE SET
                attributes = excluded.attributes,
                version = excluded.version,
                updated_at = excluded.updated_at
            WHERE {t}.version = ?3
            "#,
            t = quoted
        ))
        .bind(&record.id)
        .bind(&document)
        .bind(record.version)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::VersionConflict {
                table: table.to_string(),
                id: record.id.clone(),
                expected: record.version,
            });
        }

        debug!(table = %table, id = %record.id, version = record.version + 1, "Catalog put");
        Ok(record.version + 1)
    }
}

/// Validate a table name and quote it as an SQL identifier
///
/// Accepts the characters allowed in catalog table names:
/// ASCII alphanumerics, `_`, `-` and `.`.
pub(crate) fn quote_table(table: &str) -> Result<String> {
    let valid = !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if !valid {
        return Err(Error::InvalidInput(format!("Invalid table name: {:?}", table)));
    }
    Ok(format!("\"{}\"", table))
}
