//! The recommendation engine
//!
//! A request flows through cache lookup, the four signals (run concurrently),
//! the combiner and the ranker, and ends with a cache write when every signal
//! answered. Anything that breaks outside a single signal degrades the answer
//! to nearby products.

use chrono::{Duration as ChronoDuration, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::ComputeError;
use crate::cache::{CacheKey, CacheStore, RecommendationCache};
use crate::config::{BazaarConfig, RecommendationConfig};
use crate::models::{
    EventType, PopularShop, Recommendation, TrendingProduct, UserEvent, UserProfile,
};
use crate::scoring::{ScoreCombiner, rank, resolve};
use crate::signals::{
    self, CollaborativeSignal, ContentSignal, LocationSignal, RequestContext, Signal,
    TrendingSignal,
};
use crate::similarity::{ModelStatus, SimilarityModel, SimilarityModelBuilder};
use crate::storage::{ArtifactStore, CatalogStore, GeoPoint};
use crate::{BazaarError, Result};

/// Radius of the area trending and popular shop queries
pub const AREA_RADIUS_METERS: f64 = 5000.0;

/// Window of the area trending query
pub const AREA_TRENDING_DAYS: i64 = 7;

/// Window of the popular shops query
pub const POPULAR_SHOPS_DAYS: i64 = 30;

/// Parameters of one recommendation request
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationRequest {
    pub user_id: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    /// Falls back to the configured default when absent
    pub limit: Option<usize>,
}

impl RecommendationRequest {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            latitude: None,
            longitude: None,
            limit: None,
        }
    }

    pub fn at(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Snapshot of engine dependencies for health reporting
#[derive(Debug, Clone, PartialEq)]
pub struct EngineHealth {
    pub catalog_available: bool,
    pub model: ModelStatus,
}

/// Hybrid recommendation engine. Construct once and share behind an `Arc`.
#[derive(Debug)]
pub struct RecommendationEngine {
    catalog: Arc<dyn CatalogStore>,
    artifacts: Arc<dyn ArtifactStore>,
    cache: RecommendationCache,
    model: Arc<SimilarityModel>,
    trainer: Arc<SimilarityModelBuilder>,
    collaborative: CollaborativeSignal,
    content: ContentSignal,
    location: LocationSignal,
    trending: TrendingSignal,
    combiner: ScoreCombiner,
    config: BazaarConfig,
}

impl RecommendationEngine {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        cache: Arc<dyn CacheStore>,
        artifacts: Arc<dyn ArtifactStore>,
        config: BazaarConfig,
    ) -> Self {
        let model = Arc::new(SimilarityModel::default());
        let trainer = Arc::new(SimilarityModelBuilder::new(
            Arc::clone(&catalog),
            Arc::clone(&artifacts),
            Arc::clone(&model),
            config.training.clone(),
        ));

        Self {
            collaborative: CollaborativeSignal::new(Arc::clone(&catalog), Arc::clone(&model)),
            content: ContentSignal::new(Arc::clone(&catalog)),
            location: LocationSignal::new(Arc::clone(&catalog)),
            trending: TrendingSignal::new(Arc::clone(&catalog)),
            cache: RecommendationCache::new(cache, config.cache.ttl),
            combiner: ScoreCombiner::new(),
            catalog,
            artifacts,
            model,
            trainer,
            config,
        }
    }

    pub fn config(&self) -> &BazaarConfig {
        &self.config
    }

    fn request_config(&self) -> &RecommendationConfig {
        &self.config.recommendations
    }

    pub fn model(&self) -> &Arc<SimilarityModel> {
        &self.model
    }

    pub fn trainer(&self) -> &Arc<SimilarityModelBuilder> {
        &self.trainer
    }

    /// Serve the most recently published similarity table, if any
    pub async fn load_model(&self) -> Result<bool> {
        let loaded = self
            .model
            .reload(self.artifacts.as_ref(), &self.config.training.artifact_name)
            .await?;
        Ok(loaded)
    }

    pub async fn health(&self) -> EngineHealth {
        let catalog_available = match self.catalog.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                warn!("Catalog health check failed: {}", e);
                false
            }
        };
        EngineHealth {
            catalog_available,
            model: self.model.status().await,
        }
    }

    /// Ranked, explained recommendations for one user.
    ///
    /// Never fails for unknown users or missing signals. When the cache or
    /// another shared dependency fails, returns an uncached nearby-products
    /// list instead; only a failure of that fallback is an error.
    pub async fn recommend(&self, request: RecommendationRequest) -> Result<Vec<Recommendation>> {
        let limit = self.effective_limit(request.limit)?;
        let location = GeoPoint::from_parts(request.latitude, request.longitude);
        let ctx = RequestContext::new(request.user_id.clone(), location, limit);
        let key = CacheKey::new(request.user_id, request.latitude, request.longitude, limit);

        let started = Instant::now();
        match self.compute(ctx.clone(), &key).await {
            Ok(recommendations) => {
                debug!(
                    user_id = %ctx.user_id,
                    count = recommendations.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Recommendations served"
                );
                Ok(recommendations)
            }
            Err(e) => {
                warn!(
                    user_id = %ctx.user_id,
                    error = %e,
                    "Recommendation computation failed, serving nearby products"
                );
                self.location_fallback(&ctx).await
            }
        }
    }

    fn effective_limit(&self, requested: Option<usize>) -> Result<usize> {
        let config = self.request_config();
        match requested {
            None => Ok(config.default_limit),
            Some(0) => Err(BazaarError::Validation(
                "limit must be greater than 0".to_string(),
            )),
            Some(limit) => Ok(limit.min(config.max_limit)),
        }
    }

    async fn compute(
        &self,
        ctx: RequestContext,
        key: &CacheKey,
    ) -> std::result::Result<Vec<Recommendation>, ComputeError> {
        if let Some(cached) = self.bounded(self.cache.get(key)).await?? {
            debug!(user_id = %ctx.user_id, "Recommendation cache hit");
            return Ok(cached);
        }

        let profile = self.load_profile(&ctx.user_id).await;
        let ctx = ctx.with_profile(profile);
        let timeout = self.request_config().provider_timeout;

        let (collaborative, content, location, trending) = tokio::join!(
            signals::collect(&self.collaborative, &ctx, timeout),
            signals::collect(&self.content, &ctx, timeout),
            signals::collect(&self.location, &ctx, timeout),
            signals::collect(&self.trending, &ctx, timeout),
        );

        let mut combined = self.combiner.combine([
            (Signal::Collaborative, &collaborative.candidates),
            (Signal::Content, &content.candidates),
            (Signal::Location, &location.candidates),
            (Signal::Trending, &trending.candidates),
        ]);
        combined.retain(|product_id, _| !ctx.profile.purchased_products.contains(product_id));

        let ranked = rank(combined, ctx.limit);
        let recommendations = resolve(self.catalog.as_ref(), ranked).await;

        let degraded: Vec<Signal> = [&collaborative, &content, &location, &trending]
            .into_iter()
            .filter(|outcome| outcome.is_degraded())
            .map(|outcome| outcome.signal)
            .collect();
        if !degraded.is_empty() {
            info!(
                user_id = %ctx.user_id,
                degraded = ?degraded,
                "Partial recommendations not cached"
            );
            return Ok(recommendations);
        }

        match self.bounded(self.cache.put(key, &recommendations)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(user_id = %ctx.user_id, error = %e, "Failed to cache recommendations"),
            Err(e) => warn!(user_id = %ctx.user_id, error = %e, "Failed to cache recommendations"),
        }

        Ok(recommendations)
    }

    /// Run a cache call under the request timeout
    async fn bounded<T>(
        &self,
        call: impl Future<Output = T>,
    ) -> std::result::Result<T, ComputeError> {
        let timeout = self.request_config().provider_timeout;
        tokio::time::timeout(timeout, call)
            .await
            .map_err(|_| ComputeError::CacheTimeout(timeout))
    }

    /// The requester's profile, or an empty one when it is unknown or
    /// cannot be loaded in time
    async fn load_profile(&self, user_id: &str) -> UserProfile {
        let timeout = self.request_config().provider_timeout;
        match tokio::time::timeout(timeout, self.catalog.user_profile(user_id)).await {
            Ok(Ok(Some(profile))) => profile,
            Ok(Ok(None)) => {
                debug!(user_id, "Unknown user, using an empty profile");
                UserProfile::empty()
            }
            Ok(Err(e)) => {
                warn!(user_id, error = %e, "Failed to load user profile");
                UserProfile::empty()
            }
            Err(_) => {
                warn!(user_id, "Timed out loading user profile");
                UserProfile::empty()
            }
        }
    }

    /// Nearby products only, uncached. Empty without coordinates.
    async fn location_fallback(&self, ctx: &RequestContext) -> Result<Vec<Recommendation>> {
        let Some(point) = ctx.location else {
            return Ok(Vec::new());
        };

        let timeout = self.request_config().provider_timeout;
        let candidates = match tokio::time::timeout(timeout, self.location.nearby(point, ctx.limit)).await {
            Ok(Ok(candidates)) => candidates,
            Ok(Err(e)) => {
                error!(user_id = %ctx.user_id, error = %e, "Fallback recommendations failed");
                return Err(BazaarError::Unavailable);
            }
            Err(_) => {
                error!(user_id = %ctx.user_id, "Fallback recommendations timed out");
                return Err(BazaarError::Unavailable);
            }
        };

        let combined = self.combiner.combine([(Signal::Location, &candidates)]);
        Ok(resolve(self.catalog.as_ref(), rank(combined, ctx.limit)).await)
    }

    /// Record an event and drop the user's cached lists
    pub async fn track_event(
        &self,
        user_id: &str,
        event_type: EventType,
        event_data: serde_json::Value,
    ) -> Result<UserEvent> {
        if user_id.trim().is_empty() {
            return Err(BazaarError::Validation(
                "user_id must not be empty".to_string(),
            ));
        }

        let event = self
            .catalog
            .append_event(UserEvent::new(user_id, event_type, event_data))
            .await?;
        self.cache.invalidate_user(user_id).await?;

        debug!(user_id, event_type = %event.event_type, "Tracked user event");
        Ok(event)
    }

    /// Start a background retraining run and return immediately
    pub fn retrain_model(&self) -> JoinHandle<()> {
        info!("Model retraining requested");
        self.trainer.spawn()
    }

    /// Products with recent activity from shops near a point
    pub async fn trending_products(
        &self,
        latitude: f64,
        longitude: f64,
        limit: Option<usize>,
    ) -> Result<Vec<TrendingProduct>> {
        let limit = self.effective_limit(limit)?;
        let since = Utc::now() - ChronoDuration::days(AREA_TRENDING_DAYS);
        let products = self
            .catalog
            .trending_near(GeoPoint::new(latitude, longitude), AREA_RADIUS_METERS, since, limit)
            .await?;
        Ok(products)
    }

    /// Open shops near a point ranked by recent orders
    pub async fn popular_shops(
        &self,
        latitude: f64,
        longitude: f64,
        limit: Option<usize>,
    ) -> Result<Vec<PopularShop>> {
        let limit = self.effective_limit(limit)?;
        let since = Utc::now() - ChronoDuration::days(POPULAR_SHOPS_DAYS);
        let shops = self
            .catalog
            .popular_shops_near(GeoPoint::new(latitude, longitude), AREA_RADIUS_METERS, since, limit)
            .await?;
        Ok(shops)
    }

    /// Timeout used for signals and cache calls
    pub fn provider_timeout(&self) -> Duration {
        self.request_config().provider_timeout
    }
}
