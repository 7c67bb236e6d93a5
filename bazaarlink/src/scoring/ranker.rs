//! Ordering, truncation and metadata resolution

use futures::future::join_all;
use tracing::{debug, warn};

use super::combiner::{CombinedCandidate, CombinedMap};
use crate::models::Recommendation;
use crate::storage::CatalogStore;

/// Highest score first, ties by product id ascending, at most `limit` items
pub fn rank(candidates: CombinedMap, limit: usize) -> Vec<CombinedCandidate> {
    let mut ranked: Vec<CombinedCandidate> = candidates.into_values().collect();
    ranked.sort_by(|a, b| {
        b.total_score
            .total_cmp(&a.total_score)
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
    ranked.truncate(limit);
    ranked
}

/// Attach display metadata, keeping rank order.
///
/// Products whose lookup fails or finds nothing are dropped, so the result may
/// be shorter than the input.
pub async fn resolve(catalog: &dyn CatalogStore, ranked: Vec<CombinedCandidate>) -> Vec<Recommendation> {
    let lookups = ranked
        .iter()
        .map(|candidate| catalog.product_details(&candidate.product_id));
    let details = join_all(lookups).await;

    ranked
        .into_iter()
        .zip(details)
        .filter_map(|(candidate, details)| match details {
            Ok(Some(details)) => Some(Recommendation::from_details(
                details,
                candidate.total_score,
                candidate.reason,
            )),
            Ok(None) => {
                debug!(product_id = %candidate.product_id, "Dropping candidate without product details");
                None
            }
            Err(e) => {
                warn!(
                    product_id = %candidate.product_id,
                    error = %e,
                    "Failed to load product details, dropping candidate"
                );
                None
            }
        })
        .collect()
}
