//! Periodic background retraining

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use super::{SimilarityModelBuilder, TrainingOutcome};

/// Retrain every `interval`, starting one interval from now.
///
/// Runs until the returned handle is aborted. Failed runs are logged and
/// retried at the next tick.
pub fn spawn_periodic_retraining(
    builder: Arc<SimilarityModelBuilder>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // first tick completes immediately
        ticker.tick().await;

        info!("Scheduled model retraining every {:?}", interval);
        loop {
            ticker.tick().await;
            match builder.run().await {
                Ok(TrainingOutcome::Published(report)) => {
                    info!("Scheduled retraining published {} users", report.users)
                }
                Ok(TrainingOutcome::Skipped(reason)) => {
                    info!("Scheduled retraining skipped: {}", reason)
                }
                Err(e) => error!("Scheduled retraining failed: {}", e),
            }
        }
    })
}
