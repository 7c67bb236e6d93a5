//! Caching of computed recommendation lists
//!
//! [`CacheStore`] is the key/value capability the engine writes through; the
//! [`RecommendationCache`] on top of it owns the key layout, JSON encoding, and
//! the per-user invalidation rule.

pub mod memory;
pub mod recommendations;
#[cfg(feature = "redis-cache")]
pub mod redis;

pub use memory::MemoryCacheStore;
pub use recommendations::{CacheKey, RecommendationCache};
#[cfg(feature = "redis-cache")]
pub use self::redis::RedisCacheStore;

use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by cache backends
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    #[error("Cache operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Cache serialization error: {0}")]
    Serialization(String),

    #[error("Invalid cache configuration: {0}")]
    InvalidConfig(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization(err.to_string())
    }
}

impl From<CacheError> for crate::BazaarError {
    fn from(err: CacheError) -> Self {
        crate::BazaarError::Cache(err.to_string())
    }
}

/// String key/value store with expiry
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheStore: Send + Sync + Debug + 'static {
    /// Fetch a live entry
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Store `value` under `key` for `ttl`
    async fn set(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()>;

    /// Remove every entry whose key starts with `prefix`, returning how many
    async fn delete_prefix(&self, prefix: &str) -> CacheResult<usize>;
}
