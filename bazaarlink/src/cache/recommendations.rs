//! Per-request recommendation cache entries

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::{CacheResult, CacheStore};
use crate::models::Recommendation;

pub const KEY_PREFIX: &str = "recommendations";

/// Default lifetime of a cached list
pub const DEFAULT_TTL: Duration = Duration::from_secs(1800);

/// Request shape a cached list was computed for.
///
/// Coordinates are used as given, without rounding, so nearby positions of the
/// same user are separate entries.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheKey {
    pub user_id: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub limit: usize,
}

impl CacheKey {
    pub fn new(
        user_id: impl Into<String>,
        latitude: Option<f64>,
        longitude: Option<f64>,
        limit: usize,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            latitude,
            longitude,
            limit,
        }
    }

    /// `recommendations:{user}:{lat}:{lon}:{limit}`, `-` for a missing coordinate
    pub fn render(&self) -> String {
        format!(
            "{}{}:{}:{}",
            Self::user_prefix(&self.user_id),
            coordinate(self.latitude),
            coordinate(self.longitude),
            self.limit
        )
    }

    /// Prefix shared by every key of `user_id`
    pub fn user_prefix(user_id: &str) -> String {
        format!("{}:{}:", KEY_PREFIX, user_id)
    }
}

fn coordinate(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Typed view over a [`CacheStore`] holding ranked lists as JSON
#[derive(Debug, Clone)]
pub struct RecommendationCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl RecommendationCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached list for `key`. An entry that no longer decodes counts as a miss.
    pub async fn get(&self, key: &CacheKey) -> CacheResult<Option<Vec<Recommendation>>> {
        let rendered = key.render();
        let Some(raw) = self.store.get(&rendered).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(list) => Ok(Some(list)),
            Err(e) => {
                warn!("Ignoring undecodable cache entry {}: {}", rendered, e);
                Ok(None)
            }
        }
    }

    pub async fn put(&self, key: &CacheKey, recommendations: &[Recommendation]) -> CacheResult<()> {
        let value = serde_json::to_string(recommendations)?;
        self.store.set(&key.render(), value, self.ttl).await
    }

    /// Drop every cached list of `user_id`, whatever location and limit
    pub async fn invalidate_user(&self, user_id: &str) -> CacheResult<usize> {
        let removed = self
            .store
            .delete_prefix(&CacheKey::user_prefix(user_id))
            .await?;
        debug!(user_id, removed, "Invalidated cached recommendations");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCacheStore;

    fn cache() -> RecommendationCache {
        RecommendationCache::new(Arc::new(MemoryCacheStore::new(16).unwrap()), DEFAULT_TTL)
    }

    fn recommendation(id: &str) -> Recommendation {
        Recommendation {
            product_id: id.to_string(),
            product_name: "Bread".to_string(),
            shop_name: "Bakery".to_string(),
            price: 3.0,
            discount_price: None,
            image_url: None,
            score: 0.5,
            reason: "Trending product in your area".to_string(),
        }
    }

    #[test]
    fn test_key_rendering() {
        assert_eq!(
            CacheKey::new("u1", None, None, 10).render(),
            "recommendations:u1:-:-:10"
        );
        assert_eq!(
            CacheKey::new("u1", Some(40.7128), Some(-74.006), 5).render(),
            "recommendations:u1:40.7128:-74.006:5"
        );
        assert_eq!(
            CacheKey::new("u1", Some(0.0), Some(0.0), 5).render(),
            "recommendations:u1:0:0:5"
        );
    }

    #[tokio::test]
    async fn test_put_get_invalidate() {
        let cache = cache();
        let near = CacheKey::new("u1", Some(1.0), Some(2.0), 10);
        let far = CacheKey::new("u1", None, None, 5);
        let other = CacheKey::new("u11", None, None, 5);

        cache.put(&near, &[recommendation("p1")]).await.unwrap();
        cache.put(&far, &[]).await.unwrap();
        cache.put(&other, &[recommendation("p2")]).await.unwrap();

        assert_eq!(
            cache.get(&near).await.unwrap(),
            Some(vec![recommendation("p1")])
        );
        assert_eq!(cache.get(&far).await.unwrap(), Some(vec![]));

        assert_eq!(cache.invalidate_user("u1").await.unwrap(), 2);
        assert!(cache.get(&near).await.unwrap().is_none());
        assert!(cache.get(&other).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_miss() {
        let store = Arc::new(MemoryCacheStore::new(4).unwrap());
        let cache = RecommendationCache::new(store.clone(), DEFAULT_TTL);
        let key = CacheKey::new("u1", None, None, 10);
        store
            .set(&key.render(), "not json".to_string(), DEFAULT_TTL)
            .await
            .unwrap();

        assert!(cache.get(&key).await.unwrap().is_none());
    }
}
