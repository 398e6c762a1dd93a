//! vodcat-ingest - apply one notification event to the catalog
//!
//! Reads a notification event (JSON) from `--event` or stdin, dispatches
//! every record in it and logs the outcome. Exits non-zero on the first
//! rejected notification.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use vodcat_common::catalog::SqliteCatalog;
use vodcat_common::config::{resolve_database_path, ConfigResolver};
use vodcat_common::directory::{SqliteDirectory, StaticDirectory};
use vodcat_common::{KeyScheme, TableDirectory};
use vodcat_ingest::{Dispatcher, NotificationEvent, Outcome};

/// Command-line arguments for vodcat-ingest
#[derive(Parser, Debug)]
#[command(name = "vodcat-ingest")]
#[command(about = "Reconcile catalog variations from media notifications")]
#[command(version)]
struct Args {
    /// Config file (overrides VODCAT_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Catalog database file (overrides VODCAT_DATABASE and config)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Lookup key scheme (overrides config)
    #[arg(long, value_parser = ["indexed", "named"])]
    key_scheme: Option<String>,

    /// Event file; stdin when omitted
    #[arg(short, long)]
    event: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ConfigResolver::new(args.config.clone())
        .load()
        .context("Failed to load configuration")?;
    vodcat_common::logging::init_tracing(&config.logging)
        .context("Failed to initialize logging")?;

    info!(
        "Starting vodcat-ingest v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let scheme = match &args.key_scheme {
        Some(value) => value.parse::<KeyScheme>()?,
        None => config.catalog.key_scheme,
    };

    let db_path = resolve_database_path(args.database.as_deref(), &config);
    info!("Catalog database: {}", db_path.display());
    let catalog = SqliteCatalog::open(&db_path)
        .await
        .with_context(|| format!("Failed to open catalog {}", db_path.display()))?;

    let directory: Arc<dyn TableDirectory> = if config.catalog.tables.is_empty() {
        Arc::new(SqliteDirectory::new(catalog.pool().clone()))
    } else {
        info!(
            "Using configured table directory ({} categories)",
            config.catalog.tables.len()
        );
        Arc::new(StaticDirectory::new(config.catalog.tables.clone()))
    };

    let event = read_event(args.event.as_ref())?;
    let dispatcher = Dispatcher::new(Arc::new(catalog), directory, scheme);
    info!("Dispatching {} notification(s), key scheme {}", event.records.len(), scheme);

    let outcomes = dispatcher.handle_event(&event).await?;
    for outcome in &outcomes {
        match outcome {
            Outcome::Ignored => info!("Ignored"),
            Outcome::Unchanged { table, record_id, .. } => {
                info!("Unchanged: {} / {}", table, record_id)
            }
            Outcome::Updated {
                table,
                record_id,
                change,
                version,
                ..
            } => info!("Updated ({}): {} / {} -> v{}", change, table, record_id, version),
        }
    }

    Ok(())
}

fn read_event(path: Option<&PathBuf>) -> Result<NotificationEvent> {
    let json = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read event {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read event from stdin")?;
            buffer
        }
    };
    Ok(NotificationEvent::from_json(&json)?)
}
