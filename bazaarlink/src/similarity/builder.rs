//! Offline training of the user similarity table

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::matrix::InteractionMatrix;
use super::{SimilarityModel, SimilarityTable};
use crate::config::TrainingConfig;
use crate::storage::models::Interaction;
use crate::storage::{ArtifactStore, CatalogStore};
use crate::{BazaarError, Result};

/// Similarity is meaningless with fewer users than this
pub const MIN_USERS: usize = 2;

/// Why a run finished without publishing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No delivered orders exist yet
    NoInteractions,
    /// Delivered orders cover fewer than [`MIN_USERS`] users
    InsufficientUsers { found: usize },
    /// Another run holds the training lock
    AlreadyRunning,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoInteractions => write!(f, "no interaction data"),
            Self::InsufficientUsers { found } => {
                write!(f, "need at least {} users, found {}", MIN_USERS, found)
            }
            Self::AlreadyRunning => write!(f, "a training run is already in progress"),
        }
    }
}

/// Statistics of a published table
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub users: usize,
    pub products: usize,
    pub interactions: usize,
    pub built_at: DateTime<Utc>,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrainingOutcome {
    Published(TrainingReport),
    Skipped(SkipReason),
}

/// Builds and publishes [`SimilarityTable`]s, one run at a time.
///
/// A run that fails or is skipped leaves both the published artifact and the
/// served model untouched.
#[derive(Debug)]
pub struct SimilarityModelBuilder {
    catalog: Arc<dyn CatalogStore>,
    artifacts: Arc<dyn ArtifactStore>,
    model: Arc<SimilarityModel>,
    config: TrainingConfig,
    run_lock: Mutex<()>,
}

impl SimilarityModelBuilder {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        artifacts: Arc<dyn ArtifactStore>,
        model: Arc<SimilarityModel>,
        config: TrainingConfig,
    ) -> Self {
        Self {
            catalog,
            artifacts,
            model,
            config,
            run_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Run the full pipeline once
    pub async fn run(&self) -> Result<TrainingOutcome> {
        let Ok(_guard) = self.run_lock.try_lock() else {
            info!("Skipping model retraining: a run is already in progress");
            return Ok(TrainingOutcome::Skipped(SkipReason::AlreadyRunning));
        };

        let started = Instant::now();
        info!("Starting similarity model training");

        let interactions = self.catalog.delivered_interactions().await?;
        if interactions.is_empty() {
            info!("No interaction data found for training");
            return Ok(TrainingOutcome::Skipped(SkipReason::NoInteractions));
        }
        let interaction_count = interactions.len();
        debug!("Loaded {} interaction rows", interaction_count);

        let neighbors = self.config.neighbors;
        let computed = tokio::task::spawn_blocking(move || compute_table(&interactions, neighbors))
            .await
            .map_err(|e| BazaarError::Training(format!("training task failed: {}", e)))?;

        let (table, users, products) = match computed {
            Ok(result) => result,
            Err(reason) => {
                warn!("Aborting model training: {}", reason);
                return Ok(TrainingOutcome::Skipped(reason));
            }
        };

        let built_at = table.built_at().unwrap_or_else(Utc::now);
        self.artifacts
            .publish_similarity(&self.config.artifact_name, &table)
            .await?;
        self.model.replace(table).await;

        let report = TrainingReport {
            users,
            products,
            interactions: interaction_count,
            built_at,
            elapsed: started.elapsed(),
        };
        info!(
            users = report.users,
            products = report.products,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Similarity model trained and published"
        );
        Ok(TrainingOutcome::Published(report))
    }

    /// Run in the background, logging the outcome
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        let builder = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = builder.run().await {
                error!("Model retraining failed: {}", e);
            }
        })
    }
}

/// Pivot, standardize, and rank neighbours. Returns the table with its user and
/// product counts.
fn compute_table(
    interactions: &[Interaction],
    neighbors: usize,
) -> std::result::Result<(SimilarityTable, usize, usize), SkipReason> {
    let matrix = InteractionMatrix::from_interactions(interactions);
    let users = matrix.user_count();
    if users < MIN_USERS {
        return Err(SkipReason::InsufficientUsers { found: users });
    }
    let products = matrix.product_count();
    let table = SimilarityTable::new(matrix.nearest_neighbors(neighbors), Utc::now());
    Ok((table, users, products))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interaction(user: &str, product: &str, count: u64) -> Interaction {
        Interaction {
            user_id: user.to_string(),
            product_id: product.to_string(),
            interaction_count: count,
            last_interaction: Utc::now(),
        }
    }

    #[test]
    fn test_compute_requires_two_users() {
        let result = compute_table(&[interaction("u1", "p1", 1), interaction("u1", "p2", 4)], 10);
        assert_eq!(result.err(), Some(SkipReason::InsufficientUsers { found: 1 }));
    }

    #[test]
    fn test_compute_table_counts() {
        let (table, users, products) = compute_table(
            &[
                interaction("u1", "p1", 1),
                interaction("u2", "p2", 4),
                interaction("u3", "p1", 2),
            ],
            10,
        )
        .unwrap();

        assert_eq!(users, 3);
        assert_eq!(products, 2);
        assert_eq!(table.user_count(), 3);
        assert!(table.built_at().is_some());
        assert_eq!(table.neighbors("u1").unwrap().len(), 2);
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(
            SkipReason::InsufficientUsers { found: 1 }.to_string(),
            "need at least 2 users, found 1"
        );
    }
}
