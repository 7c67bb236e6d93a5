//! Per-request user profile built from order history

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Aggregated view of a user's history, rebuilt for every request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    /// Categories of every product the user has ordered
    pub preferred_categories: BTreeSet<String>,

    /// Every product the user has ordered
    pub purchased_products: BTreeSet<String>,

    pub total_orders: u64,
}

impl UserProfile {
    /// Profile of a user without any history
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_category_history(&self) -> bool {
        !self.preferred_categories.is_empty()
    }
}
