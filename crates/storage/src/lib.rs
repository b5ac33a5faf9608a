//! Storage layer: SQLite schema, pool setup and the document catalog.
//!
//! Holds DB pool setup, the migration runner and the `Catalog` store.

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;

pub mod catalog;
pub mod error;
pub mod models;

pub use catalog::Catalog;
pub use error::{CatalogError, Entity};
pub use models::{normalize_tag_name, Document, DocumentQuery, Tag, TagSummary};

/// Turn a plain filesystem path into an sqlx SQLite URL; URLs pass through.
pub fn database_url(database: &str) -> String {
    if database.starts_with("sqlite:") {
        return database.to_string();
    }
    let path = Path::new(database);
    let norm = path.to_string_lossy().replace('\\', "/");
    if path.is_absolute() {
        format!("sqlite:///{}", norm.trim_start_matches('/'))
    } else {
        format!("sqlite://{}", norm)
    }
}

/// Create the parent directory of a plain database path. URLs are left alone.
pub fn ensure_database_dir(database: &str) -> anyhow::Result<()> {
    if database.starts_with("sqlite:") {
        return Ok(());
    }
    if let Some(parent) = Path::new(database).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create database directory {}", parent.display()))?;
        }
    }
    Ok(())
}

pub async fn connect(database: &str) -> anyhow::Result<SqlitePool> {
    ensure_database_dir(database)?;
    let url = database_url(database);
    let options = SqliteConnectOptions::from_str(&url)
        .with_context(|| format!("invalid database url {url}"))?
        .create_if_missing(true)
        .foreign_keys(true);
    let mut opts = SqlitePoolOptions::new();
    if url.contains("memory") {
        opts = opts.max_connections(1);
    } else {
        opts = opts.max_connections(5);
    }
    let pool = opts
        .connect_with(options)
        .await
        .with_context(|| format!("open database {url}"))?;
    tracing::debug!(%url, "database connected");
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> anyhow::Result<()> {
    // Applies SQLx migrations located in crates/storage/migrations.
    // Safe to run multiple times (idempotent).
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
