use bytes::Bytes;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use xxhash_rust::xxh3::xxh3_128;

use super::backend::{CacheBackend, FilesystemCacheBackend, MemoryCacheBackend};
use super::{CacheError, Result};

/// Trait for key hashing strategies.
pub trait KeyHasher: Send + Sync {
    fn hash(&self, key: &str) -> String;
}

/// xxHash-based key hasher producing `<prefix>:<hex>` keys.
pub struct XxHasher {
    prefix: String,
}

impl XxHasher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl KeyHasher for XxHasher {
    fn hash(&self, key: &str) -> String {
        format!("{}:{:032x}", self.prefix, xxh3_128(key.as_bytes()))
    }
}

/// Counters of cache activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub deletes: u64,
}

#[derive(Debug, Default)]
pub struct CacheMetrics {
    stats: Mutex<CacheStats>,
}

impl CacheMetrics {
    fn record(&self, update: impl FnOnce(&mut CacheStats)) {
        update(&mut self.stats.lock());
    }

    /// Returns a copy of the current counters.
    pub fn snapshot(&self) -> CacheStats {
        *self.stats.lock()
    }
}

/// Backend selection for a [`CacheStore`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CacheConfig {
    /// In-process cache, lost on restart.
    Memory {
        max_entries: u64,
        #[serde(default)]
        ttl_seconds: Option<u64>,
    },
    /// Files under `path`, shared by restarts of the same deployment.
    Filesystem {
        path: PathBuf,
        #[serde(default)]
        ttl_seconds: Option<u64>,
    },
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig::Memory {
            max_entries: 10_000,
            ttl_seconds: None,
        }
    }
}

/// Cache store with a pluggable backend.
pub struct CacheStore {
    backend: Arc<dyn CacheBackend>,
    hasher: Arc<dyn KeyHasher>,
    metrics: CacheMetrics,
    use_hashing: bool,
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("backend", &self.backend.backend_type())
            .field("use_hashing", &self.use_hashing)
            .finish()
    }
}

impl CacheStore {
    pub async fn from_config(config: CacheConfig) -> Result<Self> {
        Self::from_config_with_prefix(config, "bandwidth").await
    }

    pub async fn from_config_with_prefix(config: CacheConfig, prefix: &str) -> Result<Self> {
        let backend: Arc<dyn CacheBackend> = match config {
            CacheConfig::Memory {
                max_entries,
                ttl_seconds,
            } => Arc::new(MemoryCacheBackend::new(
                max_entries,
                ttl_seconds.map(Duration::from_secs),
            )),
            CacheConfig::Filesystem { path, ttl_seconds } => Arc::new(
                FilesystemCacheBackend::new(path, ttl_seconds.map(Duration::from_secs)).await?,
            ),
        };
        Ok(Self::with_backend(backend, prefix))
    }

    /// Wraps an existing backend, e.g. a shared external store.
    pub fn with_backend(backend: Arc<dyn CacheBackend>, prefix: &str) -> Self {
        Self {
            backend,
            hasher: Arc::new(XxHasher::new(prefix)),
            metrics: CacheMetrics::default(),
            use_hashing: true,
        }
    }

    /// Configures whether keys are hashed before reaching the backend.
    pub fn with_hashing(mut self, use_hashing: bool) -> Self {
        self.use_hashing = use_hashing;
        self
    }

    fn backend_key(&self, key: &str) -> String {
        if self.use_hashing {
            self.hasher.hash(key)
        } else {
            key.to_string()
        }
    }

    pub async fn put(&self, key: impl AsRef<str>, value: impl Into<Bytes>) -> Result<()> {
        let bytes = value.into();
        debug!(key = key.as_ref(), size = bytes.len(), "Storing cache entry");
        self.backend
            .set(&self.backend_key(key.as_ref()), bytes, None)
            .await?;
        self.metrics.record(|s| s.sets += 1);
        Ok(())
    }

    pub async fn get(&self, key: impl AsRef<str>) -> Result<Option<Bytes>> {
        let result = self.backend.get(&self.backend_key(key.as_ref())).await?;
        if result.is_some() {
            debug!(key = key.as_ref(), "Cache hit");
            self.metrics.record(|s| s.hits += 1);
        } else {
            debug!(key = key.as_ref(), "Cache miss");
            self.metrics.record(|s| s.misses += 1);
        }
        Ok(result)
    }

    pub async fn delete(&self, key: impl AsRef<str>) -> Result<()> {
        debug!(key = key.as_ref(), "Deleting cache entry");
        self.backend.delete(&self.backend_key(key.as_ref())).await?;
        self.metrics.record(|s| s.deletes += 1);
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        warn!("Clearing all cache entries");
        self.backend.clear().await
    }

    /// Stores `value` as JSON.
    pub async fn put_json<T: Serialize + ?Sized>(
        &self,
        key: impl AsRef<str>,
        value: &T,
    ) -> Result<()> {
        self.put(key, serde_json::to_vec(value)?).await
    }

    /// Reads a JSON value. An entry that no longer decodes as `T` counts as absent.
    pub async fn get_json<T: DeserializeOwned>(&self, key: impl AsRef<str>) -> Result<Option<T>> {
        let Some(bytes) = self.get(key.as_ref()).await? else {
            return Ok(None);
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key = key.as_ref(), error = %e, "Discarding undecodable cache entry");
                Ok(None)
            }
        }
    }

    /// Returns the value cached under `key`, or runs `producer`, caches and
    /// returns its output.
    ///
    /// Failed producers cache nothing. There is no per-key lock: callers racing
    /// on the same missing key may each run their producer, and the last write
    /// wins.
    pub async fn wrap<T, E, F, Fut>(
        &self,
        key: impl AsRef<str>,
        producer: F,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        let key = key.as_ref();
        if let Some(value) = self.get_json::<T>(key).await? {
            return Ok(value);
        }

        let value = producer().await?;
        self.put_json(key, &value).await?;
        Ok(value)
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    pub fn backend_type(&self) -> &str {
        self.backend.backend_type()
    }
}
