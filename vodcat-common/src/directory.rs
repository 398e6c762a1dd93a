//! Table directory: category name → physical catalog table
//!
//! Physical table names carry deployment-specific suffixes
//! (`BasicNageModel-1A2B3C`), so the directory is consulted on every
//! dispatch rather than hard-coding names.

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use tracing::debug;

use crate::Result;

/// Resolves a category name to the table holding its records
#[async_trait]
pub trait TableDirectory: Send + Sync {
    /// `Ok(None)` when the directory has no table for `category`
    async fn resolve_table(&self, category: &str) -> Result<Option<String>>;
}

/// Directory sort key for a category: `basic_nage` → `BasicNageModel`
///
/// The `_model` suffix keeps short names such as `oku` from prefix-matching
/// unrelated tables. Empty `_`-separated segments are kept as `_`.
pub fn sort_key(category: &str) -> String {
    let long_name = format!("{}_model", category);
    long_name
        .split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                None => "_".to_string(),
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
            }
        })
        .collect()
}

/// Directory over the tables of a SQLite catalog database
///
/// Resolution returns the first table sorting strictly after the category's
/// sort key, and only if that table name starts with the sort key.
#[derive(Clone)]
pub struct SqliteDirectory {
    pool: SqlitePool,
}

impl SqliteDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TableDirectory for SqliteDirectory {
    async fn resolve_table(&self, category: &str) -> Result<Option<String>> {
        let key = sort_key(category);

        let next: Option<String> = sqlx::query_scalar(
            r#"
            SELECT name
            FROM sqlite_master
            WHERE type = 'table'
              AND name > ?
            ORDER BY name ASC
            LIMIT 1
            "#,
        )
        .bind(&key)
        .fetch_optional(&self.pool)
        .await?;

        debug!(category = %category, sort_key = %key, next = ?next, "Directory lookup");

        Ok(next.filter(|name| name.starts_with(&key)))
    }
}

/// Exact-match directory loaded from configuration
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    tables: BTreeMap<String, String>,
}

impl StaticDirectory {
    pub fn new(tables: BTreeMap<String, String>) -> Self {
        Self { tables }
    }

    pub fn with(mut self, category: impl Into<String>, table: impl Into<String>) -> Self {
        self.tables.insert(category.into(), table.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[async_trait]
impl TableDirectory for StaticDirectory {
    async fn resolve_table(&self, category: &str) -> Result<Option<String>> {
        Ok(self.tables.get(category).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    #[test]
    fn test_sort_key() {
        assert_eq!(sort_key("basic_nage"), "BasicNageModel");
        assert_eq!(sort_key("oku"), "OkuModel");
        assert_eq!(sort_key("kdm"), "KdmModel");
        assert_eq!(sort_key("advanced_weapons"), "AdvancedWeaponsModel");
        assert_eq!(sort_key("ALL_CAPS"), "AllCapsModel");
        assert_eq!(sort_key("double__gap"), "Double_GapModel");
    }

    async fn setup_directory(tables: &[&str]) -> SqliteDirectory {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        for table in tables {
            sqlx::query(&format!("CREATE TABLE \"{}\" (id TEXT PRIMARY KEY)", table))
                .execute(&pool)
                .await
                .unwrap();
        }
        SqliteDirectory::new(pool)
    }

    #[tokio::test]
    async fn test_resolves_first_table_after_sort_key() {
        let directory = setup_directory(&[
            "AdvancedNageModel-77",
            "BasicNageModel-1A2B",
            "BasicStickModel-9Z",
            "OkuModel-Q1",
        ])
        .await;

        assert_eq!(
            directory.resolve_table("basic_nage").await.unwrap().as_deref(),
            Some("BasicNageModel-1A2B")
        );
        assert_eq!(
            directory.resolve_table("oku").await.unwrap().as_deref(),
            Some("OkuModel-Q1")
        );
    }

    #[tokio::test]
    async fn test_rejects_neighbour_of_another_category() {
        // basic_knife has no table; the next one after its key is the nage table
        let directory = setup_directory(&["BasicNageModel-1", "BasicStickModel-2"]).await;
        assert_eq!(directory.resolve_table("basic_knife").await.unwrap(), None);

        // Nothing sorts after the key at all
        assert_eq!(directory.resolve_table("shime").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_exact_table_name_is_excluded() {
        let directory = setup_directory(&["KdmModel"]).await;
        assert_eq!(directory.resolve_table("kdm").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_static_directory() {
        let directory = StaticDirectory::default().with("goshin", "GoshinModel-A");
        assert!(!directory.is_empty());
        assert_eq!(
            directory.resolve_table("goshin").await.unwrap().as_deref(),
            Some("GoshinModel-A")
        );
        assert_eq!(directory.resolve_table("shime").await.unwrap(), None);
    }
}
