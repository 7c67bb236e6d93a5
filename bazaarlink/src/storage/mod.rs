//! Storage capabilities consumed by the recommendation engine
//!
//! The engine only depends on the traits in [`traits`]. This module also ships
//! reference implementations:
//!
//! - **MemoryCatalog**: an in-memory marketplace (users, shops, products,
//!   orders, events) that answers every catalog query, including the
//!   haversine distance filter. Can be seeded from a JSON snapshot.
//! - **FileArtifactStore**: similarity tables as versioned JSON files,
//!   replaced with write-then-rename.
//! - **MemoryArtifactStore**: similarity tables kept in process, for tests.

pub mod artifact;
pub mod errors;
pub mod memory;
pub mod models;
pub mod traits;

pub use artifact::{FileArtifactStore, MemoryArtifactStore};
pub use errors::{StorageError, StorageResult};
pub use memory::{CatalogSnapshot, MemoryCatalog};
pub use models::GeoPoint;
pub use traits::{ArtifactStore, CatalogStore};
