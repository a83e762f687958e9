//! In-memory [`Store`] implementation for tests and dry runs.
//!
//! Records live in a `Vec` behind `std::sync::RwLock`. Substring lookup is
//! a case-sensitive `str::contains`, matching the SQLite store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::CategorizedCpe;

use super::Store;

/// In-memory store for testing.
pub struct InMemoryStore {
    records: RwLock<Vec<CategorizedCpe>>,
    closed: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Copy of every stored record, in insertion order.
    pub fn records(&self) -> Vec<CategorizedCpe> {
        self.read().map(|r| r.to_vec()).unwrap_or_default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<CategorizedCpe>>, StoreError> {
        self.check_open()?;
        self.records
            .read()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }

    fn check_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StoreError::Closed(self.name().to_string()));
        }
        Ok(())
    }

    fn select(&self, pred: impl Fn(&CategorizedCpe) -> bool) -> Result<Vec<CategorizedCpe>, StoreError> {
        Ok(self.read()?.iter().filter(|c| pred(c)).cloned().collect())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn insert_cpes(&self, cpes: &[CategorizedCpe]) -> Result<(), StoreError> {
        self.check_open()?;
        let mut records = self
            .records
            .write()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))?;
        records.extend_from_slice(cpes);
        Ok(())
    }

    async fn get_by_exact_title(&self, title: &str) -> Result<Vec<CategorizedCpe>, StoreError> {
        self.select(|c| c.title == title)
    }

    async fn get_by_like_title(&self, title: &str) -> Result<Vec<CategorizedCpe>, StoreError> {
        self.select(|c| c.title.contains(title))
    }

    async fn count(&self) -> Result<i64, StoreError> {
        Ok(self.read()?.len() as i64)
    }
}
