//! Application state management

use bazaarlink::core::RecommendationEngine;
use std::sync::Arc;

use crate::config::ServerConfig;

/// Application state shared across all handlers
#[derive(Debug)]
pub struct AppState {
    /// Recommendation engine
    pub engine: Arc<RecommendationEngine>,

    /// Server configuration
    pub config: ServerConfig,
}

impl AppState {
    /// Create new application state
    pub fn new(engine: Arc<RecommendationEngine>, config: ServerConfig) -> Self {
        Self { engine, config }
    }
}
