//! Row types returned by catalog queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both coordinates must be present for a point to exist
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Some(Self::new(latitude, longitude)),
            _ => None,
        }
    }
}

/// An active product in one of the requested categories
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryProduct {
    pub product_id: String,
    pub category: String,
    pub average_rating: Option<f64>,
}

/// An active product sold by an open shop near a point
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NearbyProduct {
    pub product_id: String,

    /// Distance from the query point to the shop, as computed by the store
    pub distance_meters: f64,
}

/// Recent activity aggregated for one product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductActivity {
    pub product_id: String,

    /// Every event referencing the product in the window
    pub event_count: u64,

    /// Distinct users with a purchase event for the product in the window
    pub purchase_count: u64,
}

impl ProductActivity {
    /// Ranking key used by the trending query: purchases count five times
    pub fn weighted_count(&self) -> u64 {
        self.event_count + self.purchase_count * 5
    }
}

/// How often a user ordered a product in delivered orders
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    pub user_id: String,
    pub product_id: String,
    pub interaction_count: u64,
    pub last_interaction: DateTime<Utc>,
}
