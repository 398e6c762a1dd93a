//! Notification dispatch
//!
//! Processing is linear:
//!
//! ```text
//! Received → Classified → Decoded → Located → Reconciled → Persisted
//!     └──────────┴──────────┴─────────┴──────────┴─→ Rejected
//! ```
//!
//! Any failure moves the notification to the terminal `Rejected` stage. Nothing is
//! written before the record has been fully reconciled in memory, and a
//! notification causes at most one read and one write of the catalog.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};
use vodcat_common::{CatalogRecord, CatalogStore, KeyScheme, Predicate, TableDirectory};

use crate::lookup::build_predicate;
use crate::notification::{Notification, NotificationEvent, NotificationKind};
use crate::reconcile::{reconcile, reset, Change};
use crate::stem::extract_stem;
use crate::taxonomy::{Category, StemKey};
use crate::{Error, Result};

/// Processing stage of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Classified,
    Decoded,
    Located,
    Reconciled,
    Persisted,
    /// Terminal; reachable from every other stage
    Rejected,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Received => "received",
            Stage::Classified => "classified",
            Stage::Decoded => "decoded",
            Stage::Located => "located",
            Stage::Reconciled => "reconciled",
            Stage::Persisted => "persisted",
            Stage::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

/// Result of dispatching one notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Not a completion notification; nothing touched
    Ignored,
    /// Record located but its variation list already matched
    Unchanged {
        category: Category,
        table: String,
        record_id: String,
    },
    /// Record written back
    Updated {
        category: Category,
        table: String,
        record_id: String,
        change: Change,
        version: i64,
    },
}

/// Category → table mappings resolved while handling one event
#[derive(Debug, Default)]
pub struct DirectoryCache {
    tables: HashMap<Category, String>,
}

impl DirectoryCache {
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Orchestrates decoding, lookup and reconciliation
pub struct Dispatcher {
    store: Arc<dyn CatalogStore>,
    directory: Arc<dyn TableDirectory>,
    scheme: KeyScheme,
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        directory: Arc<dyn TableDirectory>,
        scheme: KeyScheme,
    ) -> Self {
        Self {
            store,
            directory,
            scheme,
        }
    }

    /// Dispatch every notification of an event, in order
    ///
    /// The first failure aborts the remaining notifications.
    pub async fn handle_event(&self, event: &NotificationEvent) -> Result<Vec<Outcome>> {
        if event.records.is_empty() {
            return Err(Error::MalformedNotification(
                "Event contains no records".to_string(),
            ));
        }

        let mut cache = DirectoryCache::default();
        let mut outcomes = Vec::with_capacity(event.records.len());
        for record in &event.records {
            outcomes.push(self.dispatch(&record.sns, &mut cache).await?);
        }
        Ok(outcomes)
    }

    /// Dispatch a single notification
    pub async fn dispatch(
        &self,
        notification: &Notification,
        cache: &mut DirectoryCache,
    ) -> Result<Outcome> {
        self.dispatch_traced(notification, cache).await.1
    }

    /// Dispatch a single notification, also returning the final stage
    pub async fn dispatch_traced(
        &self,
        notification: &Notification,
        cache: &mut DirectoryCache,
    ) -> (Stage, Result<Outcome>) {
        let mut stage = Stage::Received;
        debug!(stage = %stage, subject = ?notification.subject, "Notification stage reached");
        let result = self.process(notification, cache, &mut stage).await;
        if let Err(e) = &result {
            warn!(after = %stage, error = %e, "Notification rejected");
            stage = Stage::Rejected;
        }
        (stage, result)
    }

    async fn process(
        &self,
        notification: &Notification,
        cache: &mut DirectoryCache,
        stage: &mut Stage,
    ) -> Result<Outcome> {
        if notification.kind() != NotificationKind::Completion {
            info!(subject = ?notification.subject, "Ignoring non-completion notification");
            return Ok(Outcome::Ignored);
        }
        advance(stage, Stage::Classified);

        let url = notification.reference_url()?;
        let stem = extract_stem(&url)?;
        let key = StemKey::parse(&stem)?;
        let predicate = build_predicate(self.scheme, &key)?;
        advance(stage, Stage::Decoded);
        debug!(
            stem = %stem,
            domain = key.domain.name(),
            category = %key.category,
            reset = key.reset,
            predicate = %predicate,
            "Decoded stem"
        );

        let table = self.resolve_table(key.category, cache).await?;
        let mut record = self.locate(&table, &predicate).await?;
        advance(stage, Stage::Located);

        let change = if key.reset {
            reset(&mut record)
        } else {
            reconcile(&mut record, &url)?
        };
        advance(stage, Stage::Reconciled);

        if !change.needs_write() {
            info!(table = %table, record = %record.id, stem = %stem, "Variations already up to date");
            return Ok(Outcome::Unchanged {
                category: key.category,
                table,
                record_id: record.id,
            });
        }

        let version = self.store.put(&table, &record).await?;
        advance(stage, Stage::Persisted);
        info!(
            table = %table,
            record = %record.id,
            stem = %stem,
            change = %change,
            variations = record.variations.len(),
            "Variations updated"
        );

        Ok(Outcome::Updated {
            category: key.category,
            table,
            record_id: record.id,
            change,
            version,
        })
    }

    async fn resolve_table(&self, category: Category, cache: &mut DirectoryCache) -> Result<String> {
        if let Some(table) = cache.tables.get(&category) {
            return Ok(table.clone());
        }

        let table = self
            .directory
            .resolve_table(category.name())
            .await?
            .ok_or(Error::DirectoryResolution {
                category: category.name(),
            })?;
        debug!(category = %category, table = %table, "Resolved catalog table");

        cache.tables.insert(category, table.clone());
        Ok(table)
    }

    /// The single record matching `predicate`
    async fn locate(&self, table: &str, predicate: &Predicate) -> Result<CatalogRecord> {
        let mut records = self.store.scan(table, predicate).await?;
        if records.len() != 1 {
            return Err(Error::RecordLookup {
                table: table.to_string(),
                predicate: predicate.to_string(),
                matches: records.len(),
            });
        }
        Ok(records.remove(0))
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    *stage = next;
    debug!(stage = %next, "Notification stage reached");
}
