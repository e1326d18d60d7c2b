//! Memoization cache for provisioning results.
//!
//! [`CacheStore::wrap`] is the primitive the middleware uses: return the value
//! cached under a key, or run a producer and remember its output. Values are
//! stored as JSON so any backend only has to hold bytes.

pub mod backend;
pub mod store;

use thiserror::Error;

pub use backend::{CacheBackend, FilesystemCacheBackend, MemoryCacheBackend};
pub use store::{CacheConfig, CacheMetrics, CacheStats, CacheStore, KeyHasher, XxHasher};

/// Errors that can occur during cache operations.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache backend error: {0}")]
    Backend(String),
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
