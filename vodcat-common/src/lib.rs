//! # vodcat common library
//!
//! Shared code for the vodcat crates:
//! - Catalog record model and the `CatalogStore` abstraction
//! - Table directory resolution (`TableDirectory`)
//! - SQLite and in-memory backends for both
//! - Configuration loading and logging bootstrap

pub mod catalog;
pub mod config;
pub mod directory;
pub mod error;
pub mod logging;

pub use catalog::{CatalogRecord, CatalogStore, KeyScheme, Predicate};
pub use directory::TableDirectory;
pub use error::{Error, Result};
