//! Well-rated products from categories the user already buys in

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;

use super::{CandidateMap, CandidateScore, RequestContext, Signal, SignalError, SignalProvider};
use crate::storage::CatalogStore;

pub const MAX_CANDIDATES: usize = 30;
pub const CATEGORY_MATCH_SCORE: f64 = 0.8;

/// Only reachable if the store returns products outside the requested
/// categories; the category query never does.
pub const CATEGORY_MISS_SCORE: f64 = 0.3;

pub fn category_score(preferred: &BTreeSet<String>, category: &str) -> f64 {
    if preferred.contains(category) {
        CATEGORY_MATCH_SCORE
    } else {
        CATEGORY_MISS_SCORE
    }
}

#[derive(Debug, Clone)]
pub struct ContentSignal {
    catalog: Arc<dyn CatalogStore>,
}

impl ContentSignal {
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl SignalProvider for ContentSignal {
    fn signal(&self) -> Signal {
        Signal::Content
    }

    async fn candidates(&self, ctx: &RequestContext) -> Result<CandidateMap, SignalError> {
        let profile = &ctx.profile;
        if !profile.has_category_history() {
            return Ok(CandidateMap::new());
        }

        let products = self
            .catalog
            .products_in_categories(
                &profile.preferred_categories,
                &profile.purchased_products,
                MAX_CANDIDATES,
            )
            .await?;

        Ok(products
            .into_iter()
            .map(|product| {
                let score = category_score(&profile.preferred_categories, &product.category);
                let reason = format!("Based on your interest in {}", product.category);
                (
                    product.product_id.clone(),
                    CandidateScore::new(product.product_id, score, reason),
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserProfile;
    use crate::storage::memory::ProductRecord;
    use crate::storage::{CatalogSnapshot, MemoryCatalog};

    fn product(id: String, category: &str, rating: f64) -> ProductRecord {
        ProductRecord {
            id,
            shop_id: "s1".to_string(),
            name: "Loaf".to_string(),
            category: category.to_string(),
            price: 2.0,
            discount_price: None,
            image_url: None,
            is_active: true,
            average_rating: Some(rating),
        }
    }

    fn signal() -> ContentSignal {
        let mut products: Vec<ProductRecord> = (0..40)
            .map(|i| product(format!("bread-{:02}", i), "bakery", 1.0 + i as f64 / 10.0))
            .collect();
        products.push(product("hammer".to_string(), "tools", 5.0));

        ContentSignal::new(Arc::new(MemoryCatalog::from_snapshot(CatalogSnapshot {
            products,
            ..CatalogSnapshot::default()
        })))
    }

    fn bakery_buyer() -> UserProfile {
        UserProfile {
            preferred_categories: ["bakery".to_string()].into(),
            purchased_products: ["bread-39".to_string()].into(),
            total_orders: 1,
            ..UserProfile::empty()
        }
    }

    #[tokio::test]
    async fn test_candidates_from_preferred_categories() {
        let ctx = RequestContext::new("u1", None, 10).with_profile(bakery_buyer());
        let candidates = signal().candidates(&ctx).await.unwrap();

        assert_eq!(candidates.len(), MAX_CANDIDATES);
        assert!(!candidates.contains_key("bread-39"));
        assert!(!candidates.contains_key("hammer"));
        // best rated first, so the lowest rated ones fall outside the cap
        assert!(candidates.contains_key("bread-38"));
        assert!(!candidates.contains_key("bread-00"));
        for candidate in candidates.values() {
            assert_eq!(candidate.partial_score, CATEGORY_MATCH_SCORE);
            assert_eq!(candidate.reason, "Based on your interest in bakery");
        }
    }

    #[tokio::test]
    async fn test_no_category_history_is_empty() {
        let ctx = RequestContext::new("u1", None, 10);
        assert!(signal().candidates(&ctx).await.unwrap().is_empty());
    }

    #[test]
    fn test_category_score() {
        let preferred: BTreeSet<String> = ["bakery".to_string()].into();
        assert_eq!(category_score(&preferred, "bakery"), 0.8);
        assert_eq!(category_score(&preferred, "tools"), 0.3);
    }
}
