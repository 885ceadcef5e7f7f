//! Local SQLite storage
//!
//! Backs photos, wishes, site settings and analytics events when the
//! site runs without a managed backend.

pub mod models;
pub mod repository;
pub mod schema;

pub use models::*;
pub use repository::Repository;
pub use schema::initialize_database;

use crate::config::{DATABASE_BUSY_TIMEOUT, DATABASE_POOL_SIZE};
use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;

fn connect_options(db_path: &Path) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .busy_timeout(DATABASE_BUSY_TIMEOUT)
        .journal_mode(SqliteJournalMode::Wal)
}

/// Open the site database, creating and migrating it as needed.
///
/// Migration statements are split on `;` and run one by one, so they
/// go through a single connection that is closed before the shared pool
/// opens. Otherwise a pooled connection could observe a half-created
/// `photos` or `analytics_events` table while the server is starting.
pub async fn create_pool(db_path: &Path) -> Result<SqlitePool> {
    tracing::info!("Opening site database at {:?}", db_path);

    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let migrator = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(connect_options(db_path))
        .await?;
    initialize_database(&migrator).await?;
    migrator.close().await;

    let pool = SqlitePoolOptions::new()
        .max_connections(DATABASE_POOL_SIZE)
        .connect_with(connect_options(db_path))
        .await?;

    tracing::debug!("Site database ready with {} connections", DATABASE_POOL_SIZE);

    Ok(pool)
}
