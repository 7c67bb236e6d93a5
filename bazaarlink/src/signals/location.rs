//! Products sold close to the requester

use async_trait::async_trait;
use std::sync::Arc;

use super::{
    CANDIDATE_MULTIPLIER, CandidateMap, CandidateScore, RequestContext, Signal, SignalError,
    SignalProvider,
};
use crate::storage::{CatalogStore, GeoPoint};

/// Shops farther away than this are never suggested
pub const RADIUS_METERS: f64 = 5000.0;

/// 1 at the requester's position, falling linearly to 0 at [`RADIUS_METERS`]
pub fn distance_score(distance_meters: f64) -> f64 {
    (1.0 - distance_meters / RADIUS_METERS).max(0.0)
}

#[derive(Debug, Clone)]
pub struct LocationSignal {
    catalog: Arc<dyn CatalogStore>,
}

impl LocationSignal {
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self { catalog }
    }

    /// Up to `max_candidates` nearby products scored by distance
    pub async fn nearby(
        &self,
        point: GeoPoint,
        max_candidates: usize,
    ) -> Result<CandidateMap, SignalError> {
        let products = self
            .catalog
            .products_near(point, RADIUS_METERS, max_candidates)
            .await?;

        Ok(products
            .into_iter()
            .map(|p| {
                let reason = format!(
                    "Available at a nearby shop ({}m away)",
                    p.distance_meters as i64
                );
                let score = CandidateScore::new(p.product_id.clone(), distance_score(p.distance_meters), reason);
                (p.product_id, score)
            })
            .collect())
    }
}

#[async_trait]
impl SignalProvider for LocationSignal {
    fn signal(&self) -> Signal {
        Signal::Location
    }

    async fn candidates(&self, ctx: &RequestContext) -> Result<CandidateMap, SignalError> {
        match ctx.location {
            Some(point) => self.nearby(point, ctx.limit * CANDIDATE_MULTIPLIER).await,
            None => Ok(CandidateMap::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_score_bounds() {
        assert_eq!(distance_score(0.0), 1.0);
        assert_eq!(distance_score(5000.0), 0.0);
        assert_eq!(distance_score(7500.0), 0.0);
        assert!((distance_score(1250.0) - 0.75).abs() < 1e-12);
    }
}
