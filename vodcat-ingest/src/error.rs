//! Error types for vodcat-ingest
//!
//! Every variant is fatal for the notification being processed; nothing is
//! retried inside the crate.

use thiserror::Error;

/// Main error type for vodcat-ingest
#[derive(Error, Debug)]
pub enum Error {
    /// Event or message body is not usable
    #[error("Malformed notification: {0}")]
    MalformedNotification(String),

    /// URL yields no usable filename stem
    #[error("Malformed URL: {0}")]
    MalformedUrl(String),

    /// Stem ends before a required field
    #[error("Stem {stem:?} is missing its {field}")]
    TruncatedStem { stem: String, field: &'static str },

    /// First stem character is not a recognized domain marker
    #[error("Unsupported domain marker {marker:?} in stem {stem:?}")]
    UnsupportedDomain { stem: String, marker: char },

    /// Category code is not in the vocabulary
    #[error("Unknown category code {0:?}")]
    UnknownCategory(char),

    /// Payload does not fit the category's fields
    #[error("Unsupported payload {payload:?} for {category}: {reason}")]
    UnsupportedPayload {
        category: &'static str,
        payload: String,
        reason: String,
    },

    /// Category has no lookup rule under the active key scheme
    #[error("Category {category} is not implemented for the {scheme} key scheme")]
    NotImplementedCategory {
        category: &'static str,
        scheme: &'static str,
    },

    /// No physical table found for a category
    #[error("No catalog table for category {category}")]
    DirectoryResolution { category: &'static str },

    /// Zero or several records match the lookup predicate
    #[error("Expected exactly one record in {table} matching {predicate}, found {matches}")]
    RecordLookup {
        table: String,
        predicate: String,
        matches: usize,
    },

    /// Catalog store or directory failure
    #[error(transparent)]
    Store(#[from] vodcat_common::Error),
}

/// Convenience Result type using vodcat-ingest Error
pub type Result<T> = std::result::Result<T, Error>;
