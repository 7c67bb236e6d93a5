//! Products with a burst of recent activity

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;

use super::{
    CANDIDATE_MULTIPLIER, CandidateMap, CandidateScore, RequestContext, Signal, SignalError,
    SignalProvider,
};
use crate::storage::CatalogStore;
use crate::storage::models::ProductActivity;

pub const WINDOW_DAYS: i64 = 7;

/// Weighted activity at which the score saturates at 1
pub const SATURATION: f64 = 100.0;

pub const REASON: &str = "Trending product in your area";

pub fn trending_score(activity: &ProductActivity) -> f64 {
    (activity.weighted_count() as f64 / SATURATION).min(1.0)
}

#[derive(Debug, Clone)]
pub struct TrendingSignal {
    catalog: Arc<dyn CatalogStore>,
}

impl TrendingSignal {
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl SignalProvider for TrendingSignal {
    fn signal(&self) -> Signal {
        Signal::Trending
    }

    async fn candidates(&self, ctx: &RequestContext) -> Result<CandidateMap, SignalError> {
        let since = Utc::now() - Duration::days(WINDOW_DAYS);
        let activity = self
            .catalog
            .product_activity(since, ctx.limit * CANDIDATE_MULTIPLIER)
            .await?;

        Ok(activity
            .into_iter()
            .map(|a| {
                let score = CandidateScore::new(a.product_id.clone(), trending_score(&a), REASON);
                (a.product_id, score)
            })
            .collect())
    }
}
