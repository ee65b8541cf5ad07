//! Ingestion Cache for the RAG Pipeline
//!
//! Records which loaders have already been embedded and stored, so that
//! rebuilding an application over the same persistent vector database does
//! not re-embed unchanged content.
//!
//! # Cache Key Strategy
//!
//! Keys are SHA-256 hashes of the loader's unique id. The bundled loaders
//! derive their ids from content (`FileLoader` also from its path), so a
//! changed document produces a new key and is ingested again.
//!
//! An entry only says a loader was ingested at some point. The application
//! trusts it while the vector database still holds that loader's chunks, and
//! re-ingests otherwise, so a cache outliving its store is harmless.
//!
//! # Example
//!
//! ```ignore
//! use ragloom::rag::cache::{Cache, InMemoryCache};
//!
//! let cache = InMemoryCache::new();
//! let key = cache.compute_key("TextLoader_abc");
//! if !cache.has_seen(&key).await? {
//!     let inserted = ingest().await?;
//!     cache.add_seen(&key, inserted).await?;
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::types::{AppError, Result};

// ============================================================================
// Cache Types
// ============================================================================

/// Statistics for cache performance monitoring
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of lookups that found an entry
    pub hits: u64,
    /// Number of lookups that found nothing
    pub misses: u64,
    /// Number of entries in cache
    pub entry_count: usize,
}

impl CacheStats {
    /// Calculate hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

// ============================================================================
// Cache Trait
// ============================================================================

/// Trait for ingestion cache implementations
///
/// Values are the number of chunks a loader contributed, so that a cached
/// loader can still be deleted from the vector database later.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Prepare the backend (load persisted state, open connections)
    async fn init(&self) -> Result<()>;

    /// Mark `key` as ingested with `value` chunks
    async fn add_seen(&self, key: &str, value: u64) -> Result<()>;

    /// Look up the value recorded for `key`
    async fn get_seen(&self, key: &str) -> Result<Option<u64>>;

    async fn has_seen(&self, key: &str) -> Result<bool> {
        Ok(self.get_seen(key).await?.is_some())
    }

    /// Forget `key`. Missing keys are not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Compute the cache key for a loader id
    fn compute_key(&self, loader_id: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(loader_id.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Get cache statistics
    fn stats(&self) -> CacheStats;
}

// ============================================================================
// Shared Storage
// ============================================================================

/// Map plus hit/miss counters shared by the bundled cache backends.
#[derive(Default)]
struct SeenStore {
    entries: RwLock<HashMap<String, u64>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SeenStore {
    fn get(&self, key: &str) -> Option<u64> {
        let value = self.entries.read().get(key).copied();
        match value {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        value
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entry_count: self.entries.read().len(),
        }
    }
}

// ============================================================================
// In-Memory Cache
// ============================================================================

/// Process-local cache. Thread-safe via `parking_lot::RwLock`.
#[derive(Default)]
pub struct InMemoryCache {
    store: SeenStore,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.store.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.entries.read().is_empty()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn init(&self) -> Result<()> {
        Ok(())
    }

    async fn add_seen(&self, key: &str, value: u64) -> Result<()> {
        self.store.entries.write().insert(key.to_string(), value);
        Ok(())
    }

    async fn get_seen(&self, key: &str) -> Result<Option<u64>> {
        Ok(self.store.get(key))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.store.entries.write().remove(key);
        Ok(())
    }

    fn stats(&self) -> CacheStats {
        self.store.stats()
    }
}

// ============================================================================
// JSON File Cache
// ============================================================================

/// Cache persisted as a JSON object of `key -> value` on disk.
///
/// `init` loads the file when it exists. Every mutation rewrites the whole
/// file, which suits the small number of loaders an application registers.
pub struct JsonFileCache {
    path: PathBuf,
    store: SeenStore,
}

impl JsonFileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            store: SeenStore::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self) -> Result<()> {
        // Snapshot first; the lock must not be held across the write
        let snapshot = self.store.entries.read().clone();
        let json = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| AppError::Cache(format!("Failed to serialize cache: {}", e)))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl Cache for JsonFileCache {
    async fn init(&self) -> Result<()> {
        if !tokio::fs::try_exists(&self.path).await? {
            debug!(path = %self.path.display(), "Cache file absent, starting empty");
            return Ok(());
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        let loaded: HashMap<String, u64> = serde_json::from_str(&content).map_err(|e| {
            AppError::Cache(format!(
                "Failed to parse cache file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        debug!(path = %self.path.display(), entries = loaded.len(), "Loaded cache file");
        *self.store.entries.write() = loaded;
        Ok(())
    }

    async fn add_seen(&self, key: &str, value: u64) -> Result<()> {
        self.store.entries.write().insert(key.to_string(), value);
        self.persist().await
    }

    async fn get_seen(&self, key: &str) -> Result<Option<u64>> {
        Ok(self.store.get(key))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let removed = self.store.entries.write().remove(key).is_some();
        if removed {
            self.persist().await?;
        }
        Ok(())
    }

    fn stats(&self) -> CacheStats {
        self.store.stats()
    }
}

// ============================================================================
// Tests
// ============================================================================
