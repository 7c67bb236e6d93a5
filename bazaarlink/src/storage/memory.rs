//! In-memory marketplace catalog

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::{PopularShop, ProductDetails, TrendingProduct, UserEvent, UserProfile};
use crate::storage::errors::{StorageError, StorageResult};
use crate::storage::models::{
    CategoryProduct, GeoPoint, Interaction, NearbyProduct, ProductActivity,
};
use crate::storage::traits::CatalogStore;

/// Mean Earth radius used for great-circle distances
const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

fn default_true() -> bool {
    true
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    pub id: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShopRecord {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_true")]
    pub is_open: bool,
    #[serde(default)]
    pub average_rating: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductRecord {
    pub id: String,
    pub shop_id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    #[serde(default)]
    pub discount_price: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub average_rating: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    OutForDelivery,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderRecord {
    pub id: String,
    pub user_id: String,
    pub shop_id: String,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
}

/// Everything the in-memory catalog knows, as stored in a snapshot file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub users: Vec<UserRecord>,
    #[serde(default)]
    pub shops: Vec<ShopRecord>,
    #[serde(default)]
    pub products: Vec<ProductRecord>,
    #[serde(default)]
    pub orders: Vec<OrderRecord>,
    #[serde(default)]
    pub events: Vec<UserEvent>,
}

impl CatalogSnapshot {
    fn shop(&self, id: &str) -> Option<&ShopRecord> {
        self.shops.iter().find(|s| s.id == id)
    }

    fn product(&self, id: &str) -> Option<&ProductRecord> {
        self.products.iter().find(|p| p.id == id)
    }

    fn ordered_products(&self, user_id: &str) -> HashSet<&str> {
        let purchased = self
            .events
            .iter()
            .filter(|e| e.user_id == user_id && e.event_type.is_purchase())
            .filter_map(|e| e.product_id());

        self.orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .flat_map(|o| o.items.iter().map(|i| i.product_id.as_str()))
            .chain(purchased)
            .collect()
    }

    fn shop_distance(&self, shop: &ShopRecord, point: GeoPoint) -> f64 {
        haversine_meters(point, GeoPoint::new(shop.latitude, shop.longitude))
    }

    /// Events since `since` grouped by the product they reference, as
    /// (event count, distinct purchasing users)
    fn activity_since(&self, since: DateTime<Utc>) -> HashMap<&str, (u64, u64)> {
        let mut events: HashMap<&str, u64> = HashMap::new();
        let mut buyers: HashMap<&str, HashSet<&str>> = HashMap::new();

        for event in self.events.iter().filter(|e| e.created_at >= since) {
            let Some(product_id) = event.product_id() else {
                continue;
            };
            *events.entry(product_id).or_default() += 1;
            if event.event_type.is_purchase() {
                buyers
                    .entry(product_id)
                    .or_default()
                    .insert(event.user_id.as_str());
            }
        }

        events
            .into_iter()
            .map(|(product_id, count)| {
                let purchases = buyers.get(product_id).map_or(0, |b| b.len() as u64);
                (product_id, (count, purchases))
            })
            .collect()
    }
}

/// Great-circle distance between two points
pub fn haversine_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat1, lat2) = (a.latitude.to_radians(), b.latitude.to_radians());
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().min(1.0).asin()
}

/// Higher rating first, unrated last
fn by_rating_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    b.unwrap_or(f64::NEG_INFINITY)
        .total_cmp(&a.unwrap_or(f64::NEG_INFINITY))
}

/// Catalog held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    data: RwLock<CatalogSnapshot>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Self {
        Self {
            data: RwLock::new(snapshot),
        }
    }

    /// Load a JSON snapshot file
    pub async fn load(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            StorageError::Configuration(format!(
                "failed to read catalog snapshot {}: {}",
                path.display(),
                e
            ))
        })?;
        let snapshot: CatalogSnapshot = serde_json::from_slice(&bytes)?;
        debug!(
            "Loaded catalog snapshot with {} products and {} orders",
            snapshot.products.len(),
            snapshot.orders.len()
        );
        Ok(Self::from_snapshot(snapshot))
    }

    /// Copy of the current contents
    pub async fn snapshot(&self) -> CatalogSnapshot {
        self.data.read().await.clone()
    }

    pub async fn event_count(&self) -> usize {
        self.data.read().await.events.len()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn health_check(&self) -> StorageResult<bool> {
        Ok(true)
    }

    async fn user_profile(&self, user_id: &str) -> StorageResult<Option<UserProfile>> {
        let data = self.data.read().await;
        let user = data.users.iter().find(|u| u.id == user_id);
        let has_history = data.orders.iter().any(|o| o.user_id == user_id)
            || data.events.iter().any(|e| e.user_id == user_id);
        if user.is_none() && !has_history {
            return Ok(None);
        }

        // Orders and tracked events make a profile even without a users row
        let mut profile = UserProfile {
            latitude: user.and_then(|u| u.latitude),
            longitude: user.and_then(|u| u.longitude),
            ..UserProfile::empty()
        };
        for order in data.orders.iter().filter(|o| o.user_id == user_id) {
            profile.total_orders += 1;
            for item in &order.items {
                profile.purchased_products.insert(item.product_id.clone());
                if let Some(product) = data.product(&item.product_id) {
                    profile.preferred_categories.insert(product.category.clone());
                }
            }
        }

        // Purchases tracked as events count even before an order row exists
        for product_id in data
            .events
            .iter()
            .filter(|e| e.user_id == user_id && e.event_type.is_purchase())
            .filter_map(|e| e.product_id())
        {
            profile.purchased_products.insert(product_id.to_string());
            if let Some(product) = data.product(product_id) {
                profile.preferred_categories.insert(product.category.clone());
            }
        }

        Ok(Some(profile))
    }

    async fn neighbor_purchases(
        &self,
        neighbor_id: &str,
        user_id: &str,
        limit: usize,
    ) -> StorageResult<Vec<String>> {
        let data = self.data.read().await;
        let owned = data.ordered_products(user_id);

        let mut orders: Vec<&OrderRecord> = data
            .orders
            .iter()
            .filter(|o| o.user_id == neighbor_id)
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut seen = HashSet::new();
        let products = orders
            .into_iter()
            .flat_map(|o| o.items.iter().map(|i| i.product_id.as_str()))
            .filter(|id| !owned.contains(id) && data.product(id).is_some())
            .filter(|id| seen.insert(*id))
            .take(limit)
            .map(str::to_string)
            .collect();
        Ok(products)
    }

    async fn products_in_categories(
        &self,
        categories: &BTreeSet<String>,
        exclude: &BTreeSet<String>,
        limit: usize,
    ) -> StorageResult<Vec<CategoryProduct>> {
        let data = self.data.read().await;
        let mut products: Vec<&ProductRecord> = data
            .products
            .iter()
            .filter(|p| p.is_active && categories.contains(&p.category) && !exclude.contains(&p.id))
            .collect();
        products.sort_by(|a, b| {
            by_rating_desc(a.average_rating, b.average_rating).then_with(|| a.id.cmp(&b.id))
        });

        Ok(products
            .into_iter()
            .take(limit)
            .map(|p| CategoryProduct {
                product_id: p.id.clone(),
                category: p.category.clone(),
                average_rating: p.average_rating,
            })
            .collect())
    }

    async fn products_near(
        &self,
        point: GeoPoint,
        radius_meters: f64,
        limit: usize,
    ) -> StorageResult<Vec<NearbyProduct>> {
        let data = self.data.read().await;
        let mut nearby: Vec<(&ProductRecord, f64)> = data
            .products
            .iter()
            .filter(|p| p.is_active)
            .filter_map(|p| {
                let shop = data.shop(&p.shop_id).filter(|s| s.is_open)?;
                let distance = data.shop_distance(shop, point);
                (distance <= radius_meters).then_some((p, distance))
            })
            .collect();
        nearby.sort_by(|(pa, da), (pb, db)| {
            da.total_cmp(db)
                .then_with(|| by_rating_desc(pa.average_rating, pb.average_rating))
                .then_with(|| pa.id.cmp(&pb.id))
        });

        Ok(nearby
            .into_iter()
            .take(limit)
            .map(|(p, distance)| NearbyProduct {
                product_id: p.id.clone(),
                distance_meters: distance,
            })
            .collect())
    }

    async fn product_activity(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> StorageResult<Vec<ProductActivity>> {
        let data = self.data.read().await;
        let mut activity: Vec<ProductActivity> = data
            .activity_since(since)
            .into_iter()
            .filter(|(id, _)| data.product(id).is_some_and(|p| p.is_active))
            .map(|(id, (events, purchases))| ProductActivity {
                product_id: id.to_string(),
                event_count: events,
                purchase_count: purchases,
            })
            .collect();
        activity.sort_by(|a, b| {
            b.weighted_count()
                .cmp(&a.weighted_count())
                .then_with(|| a.product_id.cmp(&b.product_id))
        });
        activity.truncate(limit);
        Ok(activity)
    }

    async fn product_details(&self, product_id: &str) -> StorageResult<Option<ProductDetails>> {
        let data = self.data.read().await;
        let details = data.product(product_id).and_then(|p| {
            data.shop(&p.shop_id).map(|s| ProductDetails {
                product_id: p.id.clone(),
                name: p.name.clone(),
                shop_name: s.name.clone(),
                price: p.price,
                discount_price: p.discount_price,
                image_url: p.image_url.clone(),
            })
        });
        Ok(details)
    }

    async fn delivered_interactions(&self) -> StorageResult<Vec<Interaction>> {
        let data = self.data.read().await;
        let mut grouped: HashMap<(&str, &str), (u64, DateTime<Utc>)> = HashMap::new();

        for order in data
            .orders
            .iter()
            .filter(|o| o.status == OrderStatus::Delivered)
        {
            for item in &order.items {
                let entry = grouped
                    .entry((order.user_id.as_str(), item.product_id.as_str()))
                    .or_insert((0, order.created_at));
                entry.0 += 1;
                entry.1 = entry.1.max(order.created_at);
            }
        }

        let mut interactions: Vec<Interaction> = grouped
            .into_iter()
            .map(|((user_id, product_id), (count, last))| Interaction {
                user_id: user_id.to_string(),
                product_id: product_id.to_string(),
                interaction_count: count,
                last_interaction: last,
            })
            .collect();
        interactions.sort_by(|a, b| {
            a.user_id
                .cmp(&b.user_id)
                .then_with(|| a.product_id.cmp(&b.product_id))
        });
        Ok(interactions)
    }

    async fn trending_near(
        &self,
        point: GeoPoint,
        radius_meters: f64,
        since: DateTime<Utc>,
        limit: usize,
    ) -> StorageResult<Vec<TrendingProduct>> {
        let data = self.data.read().await;
        let mut trending: Vec<TrendingProduct> = data
            .activity_since(since)
            .into_iter()
            .filter_map(|(id, (views, orders))| {
                let product = data.product(id).filter(|p| p.is_active)?;
                let shop = data.shop(&product.shop_id)?;
                (data.shop_distance(shop, point) <= radius_meters).then(|| TrendingProduct {
                    product_id: product.id.clone(),
                    product_name: product.name.clone(),
                    shop_name: shop.name.clone(),
                    view_count: views,
                    order_count: orders,
                })
            })
            .collect();
        trending.sort_by(|a, b| {
            (b.view_count + 3 * b.order_count)
                .cmp(&(a.view_count + 3 * a.order_count))
                .then_with(|| a.product_id.cmp(&b.product_id))
        });
        trending.truncate(limit);
        Ok(trending)
    }

    async fn popular_shops_near(
        &self,
        point: GeoPoint,
        radius_meters: f64,
        since: DateTime<Utc>,
        limit: usize,
    ) -> StorageResult<Vec<PopularShop>> {
        let data = self.data.read().await;
        let mut shops: Vec<PopularShop> = data
            .shops
            .iter()
            .filter(|s| s.is_open && data.shop_distance(s, point) <= radius_meters)
            .map(|s| PopularShop {
                shop_id: s.id.clone(),
                shop_name: s.name.clone(),
                order_count: data
                    .orders
                    .iter()
                    .filter(|o| o.shop_id == s.id && o.created_at >= since)
                    .count() as u64,
                average_rating: s.average_rating.unwrap_or(0.0),
            })
            .collect();
        shops.sort_by(|a, b| {
            b.order_count
                .cmp(&a.order_count)
                .then_with(|| b.average_rating.total_cmp(&a.average_rating))
                .then_with(|| a.shop_id.cmp(&b.shop_id))
        });
        shops.truncate(limit);
        Ok(shops)
    }

    async fn append_event(&self, event: UserEvent) -> StorageResult<UserEvent> {
        if event.user_id.trim().is_empty() {
            return Err(StorageError::Validation(
                "event user_id must not be empty".to_string(),
            ));
        }
        self.data.write().await.events.push(event.clone());
        Ok(event)
    }
}
