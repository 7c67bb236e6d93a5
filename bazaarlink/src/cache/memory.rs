//! In-process LRU cache with per-entry expiry

use async_trait::async_trait;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use super::{CacheError, CacheResult, CacheStore};

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// Hit and miss counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub expired: u64,
    pub size: usize,
    pub capacity: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Bounded cache held in process memory.
///
/// Expired entries are dropped lazily when read; the LRU bound evicts the rest.
#[derive(Debug, Clone)]
pub struct MemoryCacheStore {
    entries: Arc<Mutex<LruCache<String, CacheEntry>>>,
    stats: Arc<Mutex<CacheStats>>,
}

impl MemoryCacheStore {
    pub fn new(capacity: usize) -> CacheResult<Self> {
        let cap = NonZeroUsize::new(capacity).ok_or_else(|| {
            CacheError::InvalidConfig("cache capacity must be greater than 0".to_string())
        })?;
        Ok(Self {
            entries: Arc::new(Mutex::new(LruCache::new(cap))),
            stats: Arc::new(Mutex::new(CacheStats {
                capacity,
                ..CacheStats::default()
            })),
        })
    }

    pub async fn stats(&self) -> CacheStats {
        let mut stats = self.stats.lock().await.clone();
        stats.size = self.entries.lock().await.len();
        stats
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut entries = self.entries.lock().await;
        let mut stats = self.stats.lock().await;

        let expired = match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                stats.hits += 1;
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.pop(key);
            stats.expired += 1;
        }
        stats.misses += 1;
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()> {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.lock().await.put(key.to_string(), entry);
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> CacheResult<usize> {
        let mut entries = self.entries.lock().await;
        let keys: Vec<String> = entries
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect();
        for key in &keys {
            entries.pop(key);
        }
        debug!("Removed {} cache entries with prefix {}", keys.len(), prefix);
        Ok(keys.len())
    }
}
