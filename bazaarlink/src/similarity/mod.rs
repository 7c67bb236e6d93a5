//! User-user similarity for collaborative filtering
//!
//! The [`SimilarityModelBuilder`] turns delivered-order interactions into a
//! [`SimilarityTable`] offline and publishes it through an
//! [`ArtifactStore`](crate::storage::ArtifactStore). Request handling only ever
//! reads the table through a [`SimilarityModel`], which swaps whole tables and
//! never mutates one in place.

pub mod builder;
pub mod matrix;
pub mod scheduler;

pub use builder::{SimilarityModelBuilder, SkipReason, TrainingOutcome, TrainingReport};
pub use scheduler::spawn_periodic_retraining;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::storage::{ArtifactStore, StorageResult};

/// Another user and how closely their purchases track the owner's
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Neighbor {
    pub user_id: String,

    /// Cosine similarity in `[-1, 1]`
    pub similarity: f64,
}

impl Neighbor {
    pub fn new(user_id: impl Into<String>, similarity: f64) -> Self {
        Self {
            user_id: user_id.into(),
            similarity,
        }
    }
}

/// Nearest neighbours per user, each list sorted by similarity descending
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SimilarityTable {
    neighbors: BTreeMap<String, Vec<Neighbor>>,
    built_at: Option<DateTime<Utc>>,
}

impl SimilarityTable {
    pub fn new(neighbors: BTreeMap<String, Vec<Neighbor>>, built_at: DateTime<Utc>) -> Self {
        Self {
            neighbors,
            built_at: Some(built_at),
        }
    }

    /// A table with no users, used before anything has been trained
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn neighbors(&self, user_id: &str) -> Option<&[Neighbor]> {
        self.neighbors.get(user_id).map(Vec::as_slice)
    }

    pub fn user_count(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    pub fn built_at(&self) -> Option<DateTime<Utc>> {
        self.built_at
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<Neighbor>)> {
        self.neighbors.iter()
    }
}

/// Summary of the table currently being served
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelStatus {
    pub loaded: bool,
    pub users: usize,
    pub built_at: Option<DateTime<Utc>>,
}

/// Shared handle to the table in use.
///
/// Readers clone the inner `Arc` and keep using it for the rest of their
/// request even if a newer table is swapped in meanwhile.
#[derive(Debug, Default)]
pub struct SimilarityModel {
    current: RwLock<Arc<SimilarityTable>>,
}

impl SimilarityModel {
    pub fn new(table: SimilarityTable) -> Self {
        Self {
            current: RwLock::new(Arc::new(table)),
        }
    }

    pub async fn current(&self) -> Arc<SimilarityTable> {
        self.current.read().await.clone()
    }

    /// Replace the served table
    pub async fn replace(&self, table: SimilarityTable) {
        let table = Arc::new(table);
        *self.current.write().await = table;
    }

    /// Load the published table named `name`, keeping the current one when
    /// nothing has been published. Returns whether a table was loaded.
    pub async fn reload(&self, store: &dyn ArtifactStore, name: &str) -> StorageResult<bool> {
        match store.load_similarity(name).await? {
            Some(table) => {
                tracing::info!(
                    users = table.user_count(),
                    artifact = name,
                    "Loaded similarity model"
                );
                self.replace(table).await;
                Ok(true)
            }
            None => {
                tracing::info!(artifact = name, "No similarity model published yet");
                Ok(false)
            }
        }
    }

    pub async fn status(&self) -> ModelStatus {
        let table = self.current().await;
        ModelStatus {
            loaded: table.built_at().is_some(),
            users: table.user_count(),
            built_at: table.built_at(),
        }
    }
}
