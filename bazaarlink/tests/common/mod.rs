//! Shared fixtures for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use bazaarlink::models::{PopularShop, ProductDetails, TrendingProduct, UserEvent, UserProfile};
use bazaarlink::storage::memory::{
    OrderItem, OrderRecord, OrderStatus, ProductRecord, ShopRecord, UserRecord,
};
use bazaarlink::storage::models::{CategoryProduct, Interaction, NearbyProduct, ProductActivity};
use bazaarlink::storage::{
    CatalogSnapshot, CatalogStore, GeoPoint, MemoryCatalog, StorageError, StorageResult,
};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Downtown reference point all fixture shops are placed around
pub const ORIGIN: (f64, f64) = (40.7128, -74.0060);

/// Degrees of latitude per meter, close enough for fixtures
pub const DEGREES_PER_METER: f64 = 1.0 / 111_195.0;

pub fn user(id: &str, location: Option<(f64, f64)>) -> UserRecord {
    UserRecord {
        id: id.to_string(),
        latitude: location.map(|(lat, _)| lat),
        longitude: location.map(|(_, lon)| lon),
    }
}

/// Open shop `meters_north` of [`ORIGIN`]
pub fn shop(id: &str, name: &str, meters_north: f64) -> ShopRecord {
    ShopRecord {
        id: id.to_string(),
        name: name.to_string(),
        latitude: ORIGIN.0 + meters_north * DEGREES_PER_METER,
        longitude: ORIGIN.1,
        is_open: true,
        average_rating: Some(4.0),
    }
}

pub fn product(id: &str, shop_id: &str, category: &str, rating: Option<f64>) -> ProductRecord {
    ProductRecord {
        id: id.to_string(),
        shop_id: shop_id.to_string(),
        name: format!("Product {}", id),
        category: category.to_string(),
        price: 3.5,
        discount_price: None,
        image_url: None,
        is_active: true,
        average_rating: rating,
    }
}

pub fn delivered(id: &str, user_id: &str, shop_id: &str, products: &[&str]) -> OrderRecord {
    OrderRecord {
        id: id.to_string(),
        user_id: user_id.to_string(),
        shop_id: shop_id.to_string(),
        status: OrderStatus::Delivered,
        items: products
            .iter()
            .map(|p| OrderItem {
                product_id: p.to_string(),
                quantity: 1,
            })
            .collect(),
        created_at: Utc::now() - Duration::days(2),
    }
}

/// A bakery at the origin, a grocer 1 km north and a hardware store 20 km away
pub fn marketplace() -> CatalogSnapshot {
    CatalogSnapshot {
        users: vec![
            user("u1", None),
            user("u2", Some(ORIGIN)),
            user("u3", Some(ORIGIN)),
        ],
        shops: vec![
            shop("bakery", "Corner Bakery", 0.0),
            shop("grocer", "Green Grocer", 1000.0),
            shop("hardware", "Far Hardware", 20_000.0),
        ],
        products: vec![
            product("sourdough", "bakery", "bakery", Some(4.7)),
            product("croissant", "bakery", "bakery", Some(4.9)),
            product("baguette", "bakery", "bakery", Some(4.2)),
            product("rye", "bakery", "bakery", Some(3.9)),
            product("muffin", "bakery", "bakery", None),
            product("apples", "grocer", "produce", Some(4.5)),
            product("pears", "grocer", "produce", Some(4.1)),
            product("hammer", "hardware", "tools", Some(5.0)),
        ],
        orders: vec![
            delivered("o1", "u2", "bakery", &["sourdough", "croissant"]),
            delivered("o2", "u2", "grocer", &["apples"]),
            delivered("o3", "u3", "bakery", &["sourdough", "baguette"]),
            delivered("o4", "u3", "grocer", &["pears"]),
        ],
        events: vec![],
    }
}

/// Catalog wrapper that counts profile lookups, which happen exactly once
/// per computed (uncached) recommendation request. Category lookups can be
/// switched to fail.
#[derive(Debug)]
pub struct CountingCatalog {
    inner: MemoryCatalog,
    profile_lookups: AtomicUsize,
    category_lookups_fail: AtomicBool,
}

impl CountingCatalog {
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        Self {
            inner: MemoryCatalog::from_snapshot(snapshot),
            profile_lookups: AtomicUsize::new(0),
            category_lookups_fail: AtomicBool::new(false),
        }
    }

    pub fn fail_category_lookups(&self, fail: bool) {
        self.category_lookups_fail.store(fail, Ordering::SeqCst);
    }

    pub fn profile_lookups(&self) -> usize {
        self.profile_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogStore for CountingCatalog {
    async fn health_check(&self) -> StorageResult<bool> {
        self.inner.health_check().await
    }

    async fn user_profile(&self, user_id: &str) -> StorageResult<Option<UserProfile>> {
        self.profile_lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.user_profile(user_id).await
    }

    async fn neighbor_purchases(
        &self,
        neighbor_id: &str,
        user_id: &str,
        limit: usize,
    ) -> StorageResult<Vec<String>> {
        self.inner.neighbor_purchases(neighbor_id, user_id, limit).await
    }

    async fn products_in_categories(
        &self,
        categories: &BTreeSet<String>,
        exclude: &BTreeSet<String>,
        limit: usize,
    ) -> StorageResult<Vec<CategoryProduct>> {
        if self.category_lookups_fail.load(Ordering::SeqCst) {
            return Err(StorageError::Timeout("category query".to_string()));
        }
        self.inner
            .products_in_categories(categories, exclude, limit)
            .await
    }

    async fn products_near(
        &self,
        point: GeoPoint,
        radius_meters: f64,
        limit: usize,
    ) -> StorageResult<Vec<NearbyProduct>> {
        self.inner.products_near(point, radius_meters, limit).await
    }

    async fn product_activity(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> StorageResult<Vec<ProductActivity>> {
        self.inner.product_activity(since, limit).await
    }

    async fn product_details(&self, product_id: &str) -> StorageResult<Option<ProductDetails>> {
        self.inner.product_details(product_id).await
    }

    async fn delivered_interactions(&self) -> StorageResult<Vec<Interaction>> {
        self.inner.delivered_interactions().await
    }

    async fn trending_near(
        &self,
        point: GeoPoint,
        radius_meters: f64,
        since: DateTime<Utc>,
        limit: usize,
    ) -> StorageResult<Vec<TrendingProduct>> {
        self.inner
            .trending_near(point, radius_meters, since, limit)
            .await
    }

    async fn popular_shops_near(
        &self,
        point: GeoPoint,
        radius_meters: f64,
        since: DateTime<Utc>,
        limit: usize,
    ) -> StorageResult<Vec<PopularShop>> {
        self.inner
            .popular_shops_near(point, radius_meters, since, limit)
            .await
    }

    async fn append_event(&self, event: UserEvent) -> StorageResult<UserEvent> {
        self.inner.append_event(event).await
    }
}
