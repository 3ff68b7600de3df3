//! Generic In-Memory Store
//!
//! A keyed container guarded by a reader-writer lock. Values are cloned on
//! the way in and out, so callers never hold a reference into the map.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Errors reported by [`InMemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Shutdown deadline already expired")]
    DeadlineExceeded,
}

/// Concurrency-safe keyed container.
///
/// Many readers may hold the lock at once; `put` and `delete` take it
/// exclusively. The lock is never held across a call back into the caller.
/// Concurrent puts on the same key resolve last-writer-wins.
#[derive(Debug)]
pub struct InMemoryStore<V> {
    entries: Arc<RwLock<HashMap<String, V>>>,
}

impl<V> Clone for InMemoryStore<V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<V> Default for InMemoryStore<V> {
    fn default() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<V> InMemoryStore<V>
where
    V: Clone + Send + Sync,
{
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a value by key
    pub async fn get(&self, key: &str) -> Option<V> {
        self.entries.read().await.get(key).cloned()
    }

    /// Snapshot of all values.
    ///
    /// The returned vector is a copy; later writes do not affect it.
    pub async fn get_all(&self) -> Vec<V> {
        self.entries.read().await.values().cloned().collect()
    }

    /// Insert or overwrite the value stored under `key`
    pub async fn put(&self, key: impl Into<String>, value: V) {
        self.entries.write().await.insert(key.into(), value);
    }

    /// Overwrite the value under `key` only if one is already stored.
    ///
    /// The presence check and the write happen under one write lock, so a
    /// concurrent `delete` is never undone. Returns the replaced value, or
    /// `None` (and stores nothing) if `key` was absent.
    pub async fn replace(&self, key: &str, value: V) -> Option<V> {
        let mut entries = self.entries.write().await;
        let slot = entries.get_mut(key)?;
        Some(std::mem::replace(slot, value))
    }

    /// Remove and return the value stored under `key`
    pub async fn delete(&self, key: &str) -> Option<V> {
        self.entries.write().await.remove(key)
    }

    /// Number of entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Release the store.
    ///
    /// The store owns no file handles or connections, so this only checks
    /// the deadline. Calling it more than once is harmless.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DeadlineExceeded` if `deadline` has already passed.
    pub async fn shutdown(&self, deadline: Instant) -> Result<(), StoreError> {
        if Instant::now() >= deadline {
            return Err(StoreError::DeadlineExceeded);
        }
        let entries = self.len().await;
        tracing::debug!(entries, "In-memory store shut down");
        Ok(())
    }
}
