//! In-memory catalog store
//!
//! Same semantics as the SQLite backend (attribute-equality scans,
//! version-checked puts) plus call counters, so callers can assert how many
//! reads and writes a code path issued.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

use super::{CatalogRecord, CatalogStore, Predicate};
use crate::{Error, Result};

#[derive(Default)]
pub struct MemoryCatalog {
    tables: Mutex<BTreeMap<String, Vec<CatalogRecord>>>,
    scans: AtomicUsize,
    puts: AtomicUsize,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record; ids are assigned sequentially per table
    pub async fn insert(&self, table: &str, attributes: Map<String, Value>) -> Result<CatalogRecord> {
        let mut tables = self.tables.lock().await;
        let rows = tables.entry(table.to_string()).or_default();
        let record = CatalogRecord::from_document(format!("{}#{}", table, rows.len() + 1), 0, attributes)?;
        rows.push(record.clone());
        Ok(record)
    }

    /// Current stored copy of a record
    pub async fn get(&self, table: &str, id: &str) -> Option<CatalogRecord> {
        let tables = self.tables.lock().await;
        tables.get(table)?.iter().find(|r| r.id == id).cloned()
    }

    pub fn scan_count(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Total store calls of any kind
    pub fn call_count(&self) -> usize {
        self.scan_count() + self.put_count()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn scan(&self, table: &str, predicate: &Predicate) -> Result<Vec<CatalogRecord>> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        let tables = self.tables.lock().await;
        let rows = tables
            .get(table)
            .ok_or_else(|| Error::NotFound(format!("Table {}", table)))?;
        Ok(rows
            .iter()
            .filter(|r| predicate.matches(&r.attributes))
            .cloned()
            .collect())
    }

    async fn put(&self, table: &str, record: &CatalogRecord) -> Result<i64> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        let mut tables = self.tables.lock().await;
        let rows = tables.entry(table.to_string()).or_default();

        let next = record.version + 1;
        let updated = CatalogRecord {
            version: next,
            ..record.clone()
        };
        match rows.iter().position(|r| r.id == record.id) {
            Some(i) if rows[i].version != record.version => {
                return Err(Error::VersionConflict {
                    table: table.to_string(),
                    id: record.id.clone(),
                    expected: record.version,
                });
            }
            Some(i) => rows[i] = updated,
            None => rows.push(updated),
        }
        Ok(next)
    }
}
