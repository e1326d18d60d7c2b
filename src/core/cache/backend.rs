//! Storage backends behind [`CacheStore`](super::CacheStore).

use async_trait::async_trait;
use bytes::Bytes;
use moka::future::{Cache as MokaCache, CacheBuilder as MokaCacheBuilder};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::warn;
use xxhash_rust::xxh3::xxh3_128;

use super::{CacheError, Result};
use crate::utils::random::random_readable;

/// Byte store used by the cache.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Stores a value, expiring after `ttl` when given.
    async fn set(&self, key: &str, value: Bytes, ttl: Option<Duration>) -> Result<()>;

    /// Returns the value for `key` unless absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Bytes>>;

    async fn delete(&self, key: &str) -> Result<()>;

    async fn clear(&self) -> Result<()>;

    /// Short identifier for logs ("memory", "filesystem").
    fn backend_type(&self) -> &str;
}

struct MemoryEntry {
    data: Bytes,
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|expires_at| Instant::now() > expires_at)
    }
}

/// Process-local backend built on moka.
pub struct MemoryCacheBackend {
    cache: MokaCache<String, Arc<MemoryEntry>>,
    default_ttl: Option<Duration>,
}

impl MemoryCacheBackend {
    pub fn new(max_entries: u64, default_ttl: Option<Duration>) -> Self {
        Self {
            cache: MokaCacheBuilder::new(max_entries).build(),
            default_ttl,
        }
    }
}

#[async_trait]
impl CacheBackend for MemoryCacheBackend {
    async fn set(&self, key: &str, value: Bytes, ttl: Option<Duration>) -> Result<()> {
        let entry = MemoryEntry {
            data: value,
            expires_at: ttl.or(self.default_ttl).map(|d| Instant::now() + d),
        };
        self.cache.insert(key.to_string(), Arc::new(entry)).await;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        match self.cache.get(key).await {
            Some(entry) if entry.is_expired() => {
                self.cache.invalidate(key).await;
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.data.clone())),
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        Ok(())
    }

    fn backend_type(&self) -> &str {
        "memory"
    }
}

/// Sidecar metadata written next to every filesystem entry.
#[derive(Serialize, Deserialize)]
struct EntryMeta {
    expires_at: Option<u64>,
    created_at: u64,
}

/// Backend persisting entries as files, so resolved ids survive restarts.
pub struct FilesystemCacheBackend {
    base_path: PathBuf,
    default_ttl: Option<Duration>,
}

impl FilesystemCacheBackend {
    pub async fn new(base_path: PathBuf, default_ttl: Option<Duration>) -> Result<Self> {
        fs::create_dir_all(&base_path).await?;
        Ok(Self {
            base_path,
            default_ttl,
        })
    }

    fn data_path(&self, key: &str) -> PathBuf {
        let hash = format!("{:032x}", xxh3_128(key.as_bytes()));
        self.base_path.join(&hash[0..2]).join(hash)
    }

    fn meta_path(&self, key: &str) -> PathBuf {
        self.data_path(key).with_extension("meta")
    }

    async fn remove_entry(&self, key: &str) {
        let _ = fs::remove_file(self.data_path(key)).await;
        let _ = fs::remove_file(self.meta_path(key)).await;
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Writes through a temp file so readers never observe a partial entry.
///
/// Each write gets its own temp file; concurrent writers of one key each
/// rename theirs into place and the last rename wins.
async fn write_atomic(path: &PathBuf, contents: &[u8]) -> Result<()> {
    let temp_path = path.with_extension(format!("{}.tmp", random_readable(12)));
    let result = async {
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(contents).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&temp_path, path).await
    }
    .await;

    if let Err(e) = result {
        let _ = fs::remove_file(&temp_path).await;
        return Err(e.into());
    }
    Ok(())
}

#[async_trait]
impl CacheBackend for FilesystemCacheBackend {
    async fn set(&self, key: &str, value: Bytes, ttl: Option<Duration>) -> Result<()> {
        let data_path = self.data_path(key);
        if let Some(parent) = data_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        write_atomic(&data_path, &value).await?;

        let now = unix_now();
        let meta = EntryMeta {
            expires_at: ttl.or(self.default_ttl).map(|d| now + d.as_secs()),
            created_at: now,
        };
        write_atomic(&self.meta_path(key), &serde_json::to_vec(&meta)?).await
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        let meta = match fs::read(self.meta_path(key)).await {
            Ok(raw) => serde_json::from_slice::<EntryMeta>(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if meta.expires_at.is_some_and(|expires_at| unix_now() > expires_at) {
            self.remove_entry(key).await;
            return Ok(None);
        }

        match fs::read(self.data_path(key)).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.remove_entry(key).await;
                Ok(None)
            }
            Err(e) => Err(CacheError::Io(e)),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.remove_entry(key).await;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        warn!("Clearing filesystem cache at {:?}", self.base_path);
        let _ = fs::remove_dir_all(&self.base_path).await;
        fs::create_dir_all(&self.base_path).await?;
        Ok(())
    }

    fn backend_type(&self) -> &str {
        "filesystem"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_memory_backend_expiry() {
        let backend = MemoryCacheBackend::new(10, None);
        backend
            .set("k", Bytes::from("v"), Some(Duration::from_millis(50)))
            .await
            .unwrap();
        assert_eq!(backend.get("k").await.unwrap(), Some(Bytes::from("v")));

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(backend.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_filesystem_backend_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let first = FilesystemCacheBackend::new(temp_dir.path().to_path_buf(), None)
            .await
            .unwrap();
        first.set("app##host", Bytes::from("a-1"), None).await.unwrap();

        let second = FilesystemCacheBackend::new(temp_dir.path().to_path_buf(), None)
            .await
            .unwrap();
        assert_eq!(
            second.get("app##host").await.unwrap(),
            Some(Bytes::from("a-1"))
        );

        second.delete("app##host").await.unwrap();
        assert!(first.get("app##host").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_filesystem_backend_clear() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FilesystemCacheBackend::new(temp_dir.path().join("cache"), None)
            .await
            .unwrap();
        backend.set("a", Bytes::from("1"), None).await.unwrap();
        backend.set("b", Bytes::from("2"), None).await.unwrap();

        backend.clear().await.unwrap();
        assert!(backend.get("a").await.unwrap().is_none());
        assert!(backend.get("b").await.unwrap().is_none());
    }
}
