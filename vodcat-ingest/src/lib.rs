//! # vodcat ingest
//!
//! Handles media-pipeline completion notifications: decodes the filename
//! stem of the produced artifact, locates the catalog record it belongs to
//! and reconciles that record's `Variations` list.
//!
//! Decoding ([`taxonomy`], [`lookup`]) and reconciliation ([`reconcile`])
//! are pure functions; only the [`dispatcher`] talks to the catalog store
//! and table directory.

pub mod dispatcher;
pub mod error;
pub mod lookup;
pub mod notification;
pub mod reconcile;
pub mod stem;
pub mod taxonomy;

pub use dispatcher::{Dispatcher, Outcome};
pub use error::{Error, Result};
pub use notification::NotificationEvent;
