//! Data Transfer Objects for the API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use bazaarlink::core::EngineHealth;
use bazaarlink::models::{PopularShop, Recommendation, TrendingProduct, UserEvent};

/// One recommended product
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecommendationDto {
    pub product_id: String,
    pub product_name: String,
    pub shop_name: String,
    pub price: f64,
    pub discount_price: Option<f64>,
    pub image_url: Option<String>,

    /// Combined score rounded to three decimals
    pub score: f64,

    /// Why this product was recommended
    pub reason: String,
}

impl From<Recommendation> for RecommendationDto {
    fn from(r: Recommendation) -> Self {
        Self {
            product_id: r.product_id,
            product_name: r.product_name,
            shop_name: r.shop_name,
            price: r.price,
            discount_price: r.discount_price,
            image_url: r.image_url,
            score: r.score,
            reason: r.reason,
        }
    }
}

/// Query parameters of the recommendations endpoint
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct RecommendationParams {
    /// Requester latitude; location signals need both coordinates
    pub latitude: Option<f64>,

    /// Requester longitude
    pub longitude: Option<f64>,

    /// Number of items to return (default 10)
    pub limit: Option<usize>,
}

/// Query parameters of the area endpoints
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct LimitParams {
    /// Number of items to return (default 10)
    pub limit: Option<usize>,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Request to record a user event
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TrackEventRequest {
    pub user_id: String,

    /// view, click, purchase, add_to_cart or any custom type
    #[schema(example = "view")]
    pub event_type: String,

    /// Event payload, usually carrying a `product_id`
    #[serde(default = "empty_object")]
    #[schema(value_type = Object)]
    pub event_data: serde_json::Value,
}

/// A recorded event
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TrackEventResponse {
    pub message: String,
    pub event_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserEvent> for TrackEventResponse {
    fn from(event: UserEvent) -> Self {
        Self {
            message: "Event tracked successfully".to_string(),
            event_id: event.id,
            created_at: event.created_at,
        }
    }
}

/// Product with recent activity near a point
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TrendingProductDto {
    pub product_id: String,
    pub product_name: String,
    pub shop_name: String,
    pub view_count: u64,
    pub order_count: u64,
}

impl From<TrendingProduct> for TrendingProductDto {
    fn from(t: TrendingProduct) -> Self {
        Self {
            product_id: t.product_id,
            product_name: t.product_name,
            shop_name: t.shop_name,
            view_count: t.view_count,
            order_count: t.order_count,
        }
    }
}

/// Open shop ranked by recent orders
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PopularShopDto {
    pub shop_id: String,
    pub shop_name: String,
    pub order_count: u64,
    pub average_rating: f64,
}

impl From<PopularShop> for PopularShopDto {
    fn from(s: PopularShop) -> Self {
        Self {
            shop_id: s.shop_id,
            shop_name: s.shop_name,
            order_count: s.order_count,
            average_rating: s.average_rating,
        }
    }
}

/// Plain acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Similarity model currently served
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModelStatusDto {
    pub loaded: bool,
    pub users: usize,
    pub built_at: Option<DateTime<Utc>>,
}

/// Service health
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// `healthy`, or `degraded` when the catalog does not answer
    pub status: String,
    pub service: String,
    pub version: String,
    pub catalog_available: bool,
    pub model: ModelStatusDto,
}

impl From<EngineHealth> for HealthResponse {
    fn from(health: EngineHealth) -> Self {
        Self {
            status: if health.catalog_available {
                "healthy"
            } else {
                "degraded"
            }
            .to_string(),
            service: "bazaarlink".to_string(),
            version: bazaarlink::VERSION.to_string(),
            catalog_available: health.catalog_available,
            model: ModelStatusDto {
                loaded: health.model.loaded,
                users: health.model.users,
                built_at: health.model.built_at,
            },
        }
    }
}
