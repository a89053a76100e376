//! Key-value storage backends.
//!
//! - [`MemoryStorage`]: process-local map, with failure injection for tests
//! - [`JsonFileStorage`]: single JSON object file on disk, survives restarts

use async_trait::async_trait;
use gomarket_core::{CoreError, KeyValueStore};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::persistence::{load_json_if_exists, save_json};

// ============================================================================
// Memory Storage
// ============================================================================

#[derive(Debug, Default)]
struct MemoryInner {
    values: Mutex<HashMap<String, String>>,
    writes: Mutex<Vec<(String, String)>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

/// In-memory key-value store.
///
/// Clones share the same underlying map, so a test can hand one clone to a
/// [`CartStore`](crate::CartStore) and inspect writes through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<MemoryInner>,
}

impl MemoryStorage {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with one value.
    pub fn seeded(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut values = HashMap::new();
        values.insert(key.into(), value.into());
        Self {
            inner: Arc::new(MemoryInner {
                values: Mutex::new(values),
                ..Default::default()
            }),
        }
    }

    /// Makes subsequent reads fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent writes fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Returns the raw value under `key` without going through the trait.
    pub async fn value(&self, key: &str) -> Option<String> {
        self.inner.values.lock().await.get(key).cloned()
    }

    /// Returns every successful write, oldest first.
    pub async fn writes(&self) -> Vec<(String, String)> {
        self.inner.writes.lock().await.clone()
    }

    /// Number of successful writes.
    pub async fn write_count(&self) -> usize {
        self.inner.writes.lock().await.len()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        if self.inner.fail_reads.load(Ordering::SeqCst) {
            return Err(CoreError::Storage(format!("read of {key} rejected")));
        }
        Ok(self.inner.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(CoreError::Storage(format!("write of {key} rejected")));
        }
        self.inner
            .values
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        self.inner
            .writes
            .lock()
            .await
            .push((key.to_string(), value.to_string()));
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CoreError> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(CoreError::Storage(format!("remove of {key} rejected")));
        }
        self.inner.values.lock().await.remove(key);
        Ok(())
    }
}

// ============================================================================
// JSON File Storage
// ============================================================================

/// Durable key-value store backed by one JSON object file.
///
/// Every write rewrites the whole file atomically. A process-local lock
/// serializes read-modify-write cycles; concurrent processes are not
/// coordinated.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStorage {
    /// Creates a store for the given file. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> Result<BTreeMap<String, String>, CoreError> {
        load_json_if_exists::<BTreeMap<String, String>>(&self.path)
            .await
            .map(Option::unwrap_or_default)
            .map_err(|e| self.read_error(e))
    }

    /// Like [`Self::read_map`], but a corrupt file reads as empty so the next
    /// write replaces it.
    async fn read_map_for_write(&self) -> Result<BTreeMap<String, String>, CoreError> {
        match load_json_if_exists::<BTreeMap<String, String>>(&self.path).await {
            Ok(map) => Ok(map.unwrap_or_default()),
            Err(StoreError::Serialization(e)) => {
                warn!(path = %self.path.display(), error = %e, "Replacing corrupt storage file");
                Ok(BTreeMap::new())
            }
            Err(e) => Err(self.read_error(e)),
        }
    }

    fn read_error(&self, err: StoreError) -> CoreError {
        warn!(path = %self.path.display(), error = %err, "Failed to read storage file");
        match err {
            StoreError::Serialization(e) => CoreError::Storage(format!(
                "storage file {} is corrupt ({e}); clearing the cart or deleting the file replaces it",
                self.path.display()
            )),
            other => CoreError::Storage(format!(
                "failed to read storage file {}: {other}",
                self.path.display()
            )),
        }
    }

    async fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), CoreError> {
        save_json(&self.path, map).await.map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "Failed to write storage file");
            CoreError::Storage(e.to_string())
        })
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        let _guard = self.lock.lock().await;
        let map = self.read_map().await?;
        debug!(key = %key, found = map.contains_key(key), "Storage read");
        Ok(map.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map_for_write().await?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map).await?;
        debug!(key = %key, bytes = value.len(), "Storage write");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CoreError> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        if map.remove(key).is_some() {
            self.write_map(&map).await?;
            debug!(key = %key, "Storage key removed");
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
