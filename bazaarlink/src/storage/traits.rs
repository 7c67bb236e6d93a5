//! Trait definitions for the capabilities the engine consumes

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::fmt::Debug;

use crate::models::{PopularShop, ProductDetails, TrendingProduct, UserEvent, UserProfile};
use crate::similarity::SimilarityTable;
use crate::storage::errors::StorageResult;
use crate::storage::models::{
    CategoryProduct, GeoPoint, Interaction, NearbyProduct, ProductActivity,
};

/// Read queries and the event append path of the marketplace data layer.
///
/// Implementations own query execution and geospatial distance; the engine only
/// interprets the rows they return.
#[async_trait]
pub trait CatalogStore: Send + Sync + 'static + Debug {
    /// Check if the store is healthy and available
    async fn health_check(&self) -> StorageResult<bool>;

    /// Aggregate a user's order history. `None` when the user is unknown.
    async fn user_profile(&self, user_id: &str) -> StorageResult<Option<UserProfile>>;

    /// Products `neighbor_id` ordered that `user_id` never ordered
    async fn neighbor_purchases(
        &self,
        neighbor_id: &str,
        user_id: &str,
        limit: usize,
    ) -> StorageResult<Vec<String>>;

    /// Active products in any of `categories`, excluding `exclude`, best rated first
    async fn products_in_categories(
        &self,
        categories: &BTreeSet<String>,
        exclude: &BTreeSet<String>,
        limit: usize,
    ) -> StorageResult<Vec<CategoryProduct>>;

    /// Active products of open shops within `radius_meters`, nearest first,
    /// then best rated
    async fn products_near(
        &self,
        point: GeoPoint,
        radius_meters: f64,
        limit: usize,
    ) -> StorageResult<Vec<NearbyProduct>>;

    /// Activity for active products since `since`, ordered by
    /// [`ProductActivity::weighted_count`] descending
    async fn product_activity(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> StorageResult<Vec<ProductActivity>>;

    /// Display metadata for a product. `None` when it no longer exists.
    async fn product_details(&self, product_id: &str) -> StorageResult<Option<ProductDetails>>;

    /// Per (user, product) order counts over delivered orders
    async fn delivered_interactions(&self) -> StorageResult<Vec<Interaction>>;

    /// Products with activity since `since` from shops within `radius_meters`,
    /// ordered by `view_count + 3 * order_count` descending
    async fn trending_near(
        &self,
        point: GeoPoint,
        radius_meters: f64,
        since: DateTime<Utc>,
        limit: usize,
    ) -> StorageResult<Vec<TrendingProduct>>;

    /// Open shops within `radius_meters` ordered by orders since `since`, then rating
    async fn popular_shops_near(
        &self,
        point: GeoPoint,
        radius_meters: f64,
        since: DateTime<Utc>,
        limit: usize,
    ) -> StorageResult<Vec<PopularShop>>;

    /// Append an event to the activity log
    async fn append_event(&self, event: UserEvent) -> StorageResult<UserEvent>;
}

/// Named, atomically replaced storage for trained similarity tables
#[async_trait]
pub trait ArtifactStore: Send + Sync + 'static + Debug {
    /// Load the published table, `None` if nothing was published yet
    async fn load_similarity(&self, name: &str) -> StorageResult<Option<SimilarityTable>>;

    /// Replace the published table. Readers observe either the old or the new
    /// table, never a partial write.
    async fn publish_similarity(&self, name: &str, table: &SimilarityTable) -> StorageResult<()>;
}
