//! Request-path orchestration

pub mod engine;

pub use engine::{EngineHealth, RecommendationEngine, RecommendationRequest};

use std::time::Duration;
use thiserror::Error;

use crate::cache::CacheError;

/// Failure outside any single signal. The engine answers it with a
/// location-only result instead of an error.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("cache call timed out after {0:?}")]
    CacheTimeout(Duration),
}
