//! Redis-backed cache shared between server instances

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use std::time::Duration;
use tracing::{debug, error, info};

use super::{CacheError, CacheResult, CacheStore};

fn redis_error(op: &str, err: redis::RedisError) -> CacheError {
    error!("Redis {} error: {:?}", op, err);
    CacheError::Unavailable(err.to_string())
}

/// Escape glob metacharacters so a prefix matches literally in `KEYS`
fn escape_pattern(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('*');
    escaped
}

pub struct RedisCacheStore {
    connection: ConnectionManager,
    url: String,
}

impl std::fmt::Debug for RedisCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheStore")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl RedisCacheStore {
    pub async fn connect(url: &str) -> CacheResult<Self> {
        let client = Client::open(url)
            .map_err(|e| CacheError::InvalidConfig(format!("invalid redis url: {}", e)))?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| redis_error("connect", e))?;
        info!("Connected to Redis cache at {}", url);
        Ok(Self {
            connection,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.connection.clone();
        conn.get::<_, Option<String>>(key)
            .await
            .map_err(|e| redis_error("get", e))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.connection.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1))
            .await
            .map_err(|e| redis_error("set", e))
    }

    async fn delete_prefix(&self, prefix: &str) -> CacheResult<usize> {
        let mut conn = self.connection.clone();
        let keys: Vec<String> = conn
            .keys(escape_pattern(prefix))
            .await
            .map_err(|e| redis_error("keys", e))?;
        if keys.is_empty() {
            return Ok(0);
        }

        let removed: usize = conn
            .del(&keys)
            .await
            .map_err(|e| redis_error("del", e))?;
        debug!("Removed {} redis keys with prefix {}", removed, prefix);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_pattern() {
        assert_eq!(escape_pattern("recommendations:u1:"), "recommendations:u1:*");
        assert_eq!(escape_pattern("a*b?[c]"), "a\\*b\\?\\[c\\]*");
    }
}
