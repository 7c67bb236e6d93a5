//! Domain models for products, users, and events

pub mod event;
pub mod insights;
pub mod product;
pub mod profile;

pub use event::{EventType, UserEvent};
pub use insights::{PopularShop, TrendingProduct};
pub use product::{ProductDetails, Recommendation};
pub use profile::UserProfile;
