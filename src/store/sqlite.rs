//! SQLite-backed [`Store`] implementation.
//!
//! Each [`insert_cpes`](Store::insert_cpes) call runs in one transaction,
//! so a batch is committed whole or not at all.

use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::db;
use crate::error::StoreError;
use crate::migrate;
use crate::models::CategorizedCpe;

use super::{escape_like, Store};

/// SQLite implementation of the [`Store`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to the database at `path` and create the schema if needed.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let pool = db::connect(path).await?;
        migrate::create_schema(&pool).await?;
        debug!(path = %path.display(), "sqlite store ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn row_to_cpe(row: &SqliteRow) -> Result<CategorizedCpe, sqlx::Error> {
    Ok(CategorizedCpe {
        title: row.try_get("title")?,
        cpe_uri: row.try_get("cpe_uri")?,
        cpe_fs: row.try_get("cpe_fs")?,
    })
}

#[async_trait]
impl Store for SqliteStore {
    fn name(&self) -> &str {
        "sqlite3"
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.pool.close().await;
        Ok(())
    }

    async fn insert_cpes(&self, cpes: &[CategorizedCpe]) -> Result<(), StoreError> {
        if cpes.is_empty() {
            return Ok(());
        }
        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        for cpe in cpes {
            sqlx::query(
                r#"
                INSERT INTO categorized_cpes (created_at, updated_at, title, cpe_uri, cpe_fs)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(now)
            .bind(now)
            .bind(&cpe.title)
            .bind(&cpe.cpe_uri)
            .bind(&cpe.cpe_fs)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_by_exact_title(&self, title: &str) -> Result<Vec<CategorizedCpe>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT title, cpe_uri, cpe_fs FROM categorized_cpes
            WHERE title = ? AND deleted_at IS NULL
            ORDER BY id
            "#,
        )
        .bind(title)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_cpe).collect::<Result<_, _>>()?)
    }

    async fn get_by_like_title(&self, title: &str) -> Result<Vec<CategorizedCpe>, StoreError> {
        let pattern = format!("%{}%", escape_like(title));
        let rows = sqlx::query(
            r#"
            SELECT title, cpe_uri, cpe_fs FROM categorized_cpes
            WHERE title LIKE ? ESCAPE '\' AND deleted_at IS NULL
            ORDER BY id
            "#,
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_cpe).collect::<Result<_, _>>()?)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM categorized_cpes WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
