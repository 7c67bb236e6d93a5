//! Products bought by users with similar purchase histories

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::{CandidateMap, CandidateScore, RequestContext, Signal, SignalError, SignalProvider};
use crate::similarity::SimilarityModel;
use crate::storage::CatalogStore;

pub const MAX_NEIGHBORS: usize = 5;
pub const PRODUCTS_PER_NEIGHBOR: usize = 20;
pub const REASON: &str = "Users similar to you purchased this";

#[derive(Debug, Clone)]
pub struct CollaborativeSignal {
    catalog: Arc<dyn CatalogStore>,
    model: Arc<SimilarityModel>,
}

impl CollaborativeSignal {
    pub fn new(catalog: Arc<dyn CatalogStore>, model: Arc<SimilarityModel>) -> Self {
        Self { catalog, model }
    }
}

#[async_trait]
impl SignalProvider for CollaborativeSignal {
    fn signal(&self) -> Signal {
        Signal::Collaborative
    }

    /// A product reached through several neighbours scores the highest of
    /// their similarities. Neighbours with non-positive similarity are ignored.
    async fn candidates(&self, ctx: &RequestContext) -> Result<CandidateMap, SignalError> {
        let table = self.model.current().await;
        let Some(neighbors) = table.neighbors(&ctx.user_id) else {
            debug!(user_id = %ctx.user_id, "No similarity data for user");
            return Ok(CandidateMap::new());
        };

        let mut candidates = CandidateMap::new();
        for neighbor in neighbors.iter().take(MAX_NEIGHBORS) {
            if neighbor.similarity <= 0.0 {
                continue;
            }

            let products = self
                .catalog
                .neighbor_purchases(&neighbor.user_id, &ctx.user_id, PRODUCTS_PER_NEIGHBOR)
                .await?;
            for product_id in products {
                candidates
                    .entry(product_id)
                    .and_modify(|c| c.partial_score = c.partial_score.max(neighbor.similarity))
                    .or_insert_with_key(|id| CandidateScore::new(id.clone(), neighbor.similarity, REASON));
            }
        }

        Ok(candidates)
    }
}
