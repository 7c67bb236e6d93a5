//! # BazaarLink
//!
//! Hybrid product recommendations for hyperlocal marketplaces. Four signals
//! are blended into a single ranked list per user:
//!
//! - **Collaborative**: purchases of users who buy like you (weight 0.4)
//! - **Content**: products in categories you already buy from (weight 0.3)
//! - **Location**: products from shops within 5 km (weight 0.2)
//! - **Trending**: marketplace-wide activity over the last week (weight 0.1)
//!
//! Every recommendation carries the reason of the first signal, in the order
//! above, that nominated it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bazaarlink::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ConfigBuilder::development().build()?;
//!     let _guard = bazaarlink::logging::init(&config.logging)?;
//!     let catalog = Arc::new(MemoryCatalog::load("catalog.json").await?);
//!     let engine = bazaarlink::init(config, catalog).await?;
//!
//!     let request = RecommendationRequest::new("user-42").at(40.7128, -74.0060);
//!     for recommendation in engine.recommend(request).await? {
//!         println!("{} ({}): {}", recommendation.product_name, recommendation.score, recommendation.reason);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Storage**: read-only catalog queries and similarity artifacts behind traits
//! - **Signals**: independent candidate providers, each bounded by a timeout
//! - **Scoring**: weighted combination and deterministic ranking
//! - **Cache**: per-request result lists, dropped whenever the user acts
//! - **Similarity**: offline user-user model, published atomically
//!
//! The HTTP surface lives in the separate `bazaarlink-server` crate.

pub mod cache;
pub mod config;
pub mod core;
pub mod logging;
pub mod models;
pub mod scoring;
pub mod signals;
pub mod similarity;
pub mod storage;

use std::sync::Arc;
use tracing::{info, warn};

/// The prelude re-exports commonly used types for convenience
pub mod prelude {
    pub use crate::cache::{CacheStore, MemoryCacheStore, RecommendationCache};
    pub use crate::config::{BazaarConfig, ConfigBuilder, ConfigLoader, LogLevel};
    pub use crate::core::{RecommendationEngine, RecommendationRequest};
    pub use crate::models::{
        EventType, PopularShop, Recommendation, TrendingProduct, UserEvent, UserProfile,
    };
    pub use crate::scoring::SignalWeights;
    pub use crate::signals::Signal;
    pub use crate::similarity::{SimilarityModelBuilder, TrainingOutcome};
    pub use crate::storage::{
        ArtifactStore, CatalogStore, FileArtifactStore, GeoPoint, MemoryCatalog, StorageError,
    };
    pub use crate::{BazaarError, Result};
}

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error type for BazaarLink operations
#[derive(Debug, thiserror::Error)]
pub enum BazaarError {
    /// Error during catalog or artifact storage operations
    #[error("Storage error: {0}")]
    Storage(String),

    /// Error talking to the recommendation cache
    #[error("Cache error: {0}")]
    Cache(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Logging error
    #[error("Logging error: {0}")]
    Logging(String),

    /// Similarity model training failed
    #[error("Training error: {0}")]
    Training(String),

    /// Rejected input
    #[error("Invalid input: {0}")]
    Validation(String),

    /// No answer could be produced, not even the nearby-products fallback
    #[error("Recommendations are temporarily unavailable")]
    Unavailable,

    /// Other unclassified errors
    #[error("{0}")]
    Other(String),
}

/// Result type for BazaarLink operations
pub type Result<T> = std::result::Result<T, BazaarError>;

/// Build the cache store selected by `config`
pub async fn create_cache_store(
    config: &config::CacheConfig,
) -> Result<Arc<dyn cache::CacheStore>> {
    match config.backend {
        config::CacheBackend::Memory => {
            Ok(Arc::new(cache::MemoryCacheStore::new(config.capacity)?))
        }
        #[cfg(feature = "redis-cache")]
        config::CacheBackend::Redis => {
            let url = config.redis_url.as_deref().ok_or_else(|| {
                BazaarError::Configuration("cache.redis_url is required".to_string())
            })?;
            Ok(Arc::new(cache::RedisCacheStore::connect(url).await?))
        }
        #[cfg(not(feature = "redis-cache"))]
        config::CacheBackend::Redis => Err(BazaarError::Configuration(
            "the redis cache backend requires the `redis-cache` feature".to_string(),
        )),
    }
}

/// Initialize BazaarLink with the provided configuration and catalog
///
/// Checks that the catalog answers, builds the configured cache and loads the last published similarity model. A missing or
/// unreadable model is not fatal: collaborative scores stay empty until the
/// next training run publishes one.
///
/// Logging is left to the caller, who must keep the [`logging::LogGuard`]
/// alive. The returned engine does not schedule retraining on its own; see
/// [`similarity::spawn_periodic_retraining`].
pub async fn init(
    config: config::BazaarConfig,
    catalog: Arc<dyn storage::CatalogStore>,
) -> Result<core::RecommendationEngine> {
    if !catalog.health_check().await? {
        return Err(BazaarError::Storage(
            "catalog health check failed".to_string(),
        ));
    }

    let cache = create_cache_store(&config.cache).await?;
    let artifacts = Arc::new(storage::FileArtifactStore::new(config.training.model_dir.clone()));
    let engine = core::RecommendationEngine::new(catalog, cache, artifacts, config);

    match engine.load_model().await {
        Ok(true) => info!("Loaded similarity model"),
        Ok(false) => info!("No similarity model published yet"),
        Err(e) => warn!("Failed to load similarity model: {}", e),
    }

    Ok(engine)
}
