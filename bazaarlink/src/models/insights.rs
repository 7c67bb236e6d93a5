//! Area-level activity summaries

use serde::{Deserialize, Serialize};

/// A product with recent activity near a location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendingProduct {
    pub product_id: String,
    pub product_name: String,
    pub shop_name: String,

    /// All events in the window
    pub view_count: u64,

    /// Distinct users with a purchase event in the window
    pub order_count: u64,
}

/// An open shop ranked by recent orders
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PopularShop {
    pub shop_id: String,
    pub shop_name: String,
    pub order_count: u64,
    pub average_rating: f64,
}
