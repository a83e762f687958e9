//! Database schema migrations (idempotent).
//!
//! `deleted_at` is soft-delete bookkeeping: rows with a value are ignored
//! by every lookup. Nothing in this crate sets it.

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::config::DbConfig;
use crate::db;
use crate::error::StoreError;
use crate::store::Dialect;

/// Create the `categorized_cpes` table and its indexes if missing.
pub async fn create_schema(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categorized_cpes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            deleted_at INTEGER,
            title TEXT NOT NULL,
            cpe_uri TEXT NOT NULL,
            cpe_fs TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_categorized_cpes_title ON categorized_cpes(title)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_categorized_cpes_deleted_at ON categorized_cpes(deleted_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// `cpedict init`: create the database and schema.
///
/// Returns `false` when the dialect keeps nothing on disk.
pub async fn run_migrations(config: &DbConfig) -> Result<bool> {
    let dialect: Dialect = config.dialect.parse()?;
    if dialect != Dialect::Sqlite3 {
        return Ok(false);
    }

    let pool = db::connect(&config.path)
        .await
        .with_context(|| format!("Failed to open database {}", config.path.display()))?;
    create_schema(&pool)
        .await
        .context("Failed to create schema")?;
    pool.close().await;
    Ok(true)
}
