//! Configuration builder.

use super::{Result, models::*, validation};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Builder for creating BazaarConfig instances.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: BazaarConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self {
            config: BazaarConfig::default(),
        }
    }

    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.config.recommendations.default_limit = limit;
        self
    }

    pub fn with_max_limit(mut self, limit: usize) -> Self {
        self.config.recommendations.max_limit = limit;
        self
    }

    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.config.recommendations.provider_timeout = timeout;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.config.cache.ttl = ttl;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.config.cache.capacity = capacity;
        self
    }

    /// Use a shared Redis cache
    pub fn with_redis_cache(mut self, url: impl Into<String>) -> Self {
        self.config.cache.backend = CacheBackend::Redis;
        self.config.cache.redis_url = Some(url.into());
        self
    }

    pub fn with_model_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.training.model_dir = path.as_ref().to_path_buf();
        self
    }

    /// Store models under the platform data directory
    pub fn with_default_model_dir(mut self) -> Self {
        if let Some(proj_dirs) = directories::ProjectDirs::from("org", "bazaarlink", "bazaarlink")
        {
            self.config.training.model_dir = proj_dirs.data_dir().join("models");
        }
        self
    }

    pub fn with_neighbors(mut self, neighbors: usize) -> Self {
        self.config.training.neighbors = neighbors;
        self
    }

    /// Retrain on a timer every `interval`
    pub fn with_scheduled_retraining(mut self, interval: Duration) -> Self {
        self.config.training.schedule_enabled = true;
        self.config.training.retrain_interval = interval;
        self
    }

    /// Set the log level.
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.config.logging.format = format;
        self
    }

    /// Set the log file path.
    pub fn with_log_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.logging.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Create a configuration suitable for development: debug logging, pretty
    /// output, models in the working directory.
    pub fn development() -> Self {
        Self::new()
            .with_model_dir("./models")
            .with_log_level(LogLevel::Debug)
            .with_log_format(LogFormat::Pretty)
    }

    /// Create a configuration suitable for tests: short timeouts, small cache,
    /// warnings only.
    pub fn testing() -> Self {
        Self::new()
            .with_model_dir(PathBuf::from("./test_models"))
            .with_provider_timeout(Duration::from_millis(500))
            .with_cache_capacity(256)
            .with_log_level(LogLevel::Warn)
    }

    /// Create a configuration suitable for production: JSON logs, models in
    /// the platform data directory, daily retraining.
    pub fn production() -> Self {
        Self::new()
            .with_default_model_dir()
            .with_log_format(LogFormat::Json)
            .with_scheduled_retraining(Duration::from_secs(24 * 60 * 60))
    }

    /// Build the configuration, validating it in the process.
    pub fn build(self) -> Result<BazaarConfig> {
        validation::validate_config(&self.config)?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
