//! Storage abstraction for categorized CPE records.
//!
//! The [`Store`] trait is everything the pipeline and the lookup path need
//! from a backend. One implementation exists per [`Dialect`]; the dialect
//! is chosen once, by [`open_store`], and never changes afterwards.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;
pub mod sqlite;

use std::fmt;
use std::str::FromStr;

use anyhow::Context;
use async_trait::async_trait;
use tracing::info;

use crate::config::DbConfig;
use crate::error::{Error, InvalidDialectError, StoreError};
use crate::models::CategorizedCpe;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

/// Abstract storage backend.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`name`](Store::name) | Dialect name, for logs and reports |
/// | [`close`](Store::close) | Release connections |
/// | [`insert_cpes`](Store::insert_cpes) | Insert a batch atomically |
/// | [`get_by_exact_title`](Store::get_by_exact_title) | Byte-exact title match |
/// | [`get_by_like_title`](Store::get_by_like_title) | Literal substring title match |
/// | [`count`](Store::count) | Number of live records |
#[async_trait]
pub trait Store: Send + Sync {
    fn name(&self) -> &str;

    async fn close(&self) -> Result<(), StoreError>;

    /// Insert every record or none of them.
    async fn insert_cpes(&self, cpes: &[CategorizedCpe]) -> Result<(), StoreError>;

    /// Records whose title equals `title` exactly, in insertion order.
    async fn get_by_exact_title(&self, title: &str) -> Result<Vec<CategorizedCpe>, StoreError>;

    /// Records whose title contains `title` as a literal substring, in
    /// insertion order. Wildcard characters in `title` match themselves.
    async fn get_by_like_title(&self, title: &str) -> Result<Vec<CategorizedCpe>, StoreError>;

    async fn count(&self) -> Result<i64, StoreError>;
}

/// Supported storage technologies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Sqlite3,
    Memory,
}

impl Dialect {
    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Sqlite3 => "sqlite3",
            Dialect::Memory => "memory",
        }
    }
}

impl FromStr for Dialect {
    type Err = InvalidDialectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sqlite3" | "sqlite" => Ok(Dialect::Sqlite3),
            "memory" => Ok(Dialect::Memory),
            other => Err(InvalidDialectError(other.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Open the store named by `config.dialect`.
///
/// An unknown dialect fails before anything is created. SQLite stores have
/// their schema created on open.
pub async fn open_store(config: &DbConfig) -> Result<Box<dyn Store>, Error> {
    let dialect: Dialect = config.dialect.parse()?;
    let store: Box<dyn Store> = match dialect {
        Dialect::Sqlite3 => Box::new(SqliteStore::open(&config.path).await.map_err(Error::Open)?),
        Dialect::Memory => Box::new(InMemoryStore::new()),
    };
    info!(dialect = store.name(), "store opened");
    Ok(store)
}

/// Close `store` once a stage has produced `result`.
///
/// A failed stage reports its own error even when closing fails as well;
/// the close error surfaces only after a successful stage.
pub async fn close_after<T>(store: &dyn Store, result: anyhow::Result<T>) -> anyhow::Result<T> {
    let closed = store.close().await;
    let value = result?;
    closed.context("Failed to close store")?;
    Ok(value)
}

/// Escape `%`, `_` and `\` so a value matches itself in a
/// `LIKE ... ESCAPE '\'` pattern.
pub(crate) fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_dialect_parse() {
        assert_eq!("sqlite3".parse::<Dialect>().unwrap(), Dialect::Sqlite3);
        assert_eq!("memory".parse::<Dialect>().unwrap(), Dialect::Memory);
        assert_eq!(
            "oracle".parse::<Dialect>().unwrap_err(),
            InvalidDialectError("oracle".to_string())
        );
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("nginx"), "nginx");
        assert_eq!(escape_like("100%_a\\b"), "100\\%\\_a\\\\b");
    }

    #[tokio::test]
    async fn test_open_store_rejects_unknown_dialect() {
        let config = DbConfig {
            dialect: "mongodb".to_string(),
            path: PathBuf::from("/nonexistent/never-created.sqlite"),
        };
        let err = open_store(&config).await.err().unwrap();
        assert!(matches!(err, Error::InvalidDialect(_)));
        assert!(!config.path.exists());
    }

    #[tokio::test]
    async fn test_open_memory_store() {
        let config = DbConfig {
            dialect: "memory".to_string(),
            path: PathBuf::new(),
        };
        let store = open_store(&config).await.unwrap();
        assert_eq!(store.name(), "memory");
        assert_eq!(store.count().await.unwrap(), 0);
    }

    /// Every operation fails, including close.
    struct BrokenStore;

    #[async_trait]
    impl Store for BrokenStore {
        fn name(&self) -> &str {
            "broken"
        }

        async fn close(&self) -> Result<(), StoreError> {
            Err(StoreError::Backend("disk gone".to_string()))
        }

        async fn insert_cpes(&self, _cpes: &[CategorizedCpe]) -> Result<(), StoreError> {
            Err(StoreError::Backend("insert rejected".to_string()))
        }

        async fn get_by_exact_title(&self, _title: &str) -> Result<Vec<CategorizedCpe>, StoreError> {
            Err(StoreError::Backend("query rejected".to_string()))
        }

        async fn get_by_like_title(&self, _title: &str) -> Result<Vec<CategorizedCpe>, StoreError> {
            Err(StoreError::Backend("query rejected".to_string()))
        }

        async fn count(&self) -> Result<i64, StoreError> {
            Err(StoreError::Backend("query rejected".to_string()))
        }
    }

    #[tokio::test]
    async fn test_close_after_prefers_stage_error() {
        let store = BrokenStore;
        let stage = store.insert_cpes(&[]).await.context("Ingest failed");
        let err = close_after(&store, stage).await.unwrap_err();
        assert_eq!(err.to_string(), "Ingest failed");
        assert!(format!("{:#}", err).contains("insert rejected"));
        assert!(!format!("{:#}", err).contains("disk gone"));
    }

    #[tokio::test]
    async fn test_close_after_reports_close_failure() {
        let err = close_after(&BrokenStore, Ok(3)).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to close store");
        assert!(format!("{:#}", err).contains("disk gone"));
    }

    #[tokio::test]
    async fn test_close_after_closes_store() {
        let store = InMemoryStore::new();
        assert_eq!(close_after(&store, Ok(3)).await.unwrap(), 3);
        assert!(matches!(store.count().await, Err(StoreError::Closed(_))));
    }
}
