//! Configuration validation utilities.

use super::ConfigError;
use super::models::*;

/// Validate the entire configuration.
pub fn validate_config(config: &BazaarConfig) -> Result<(), ConfigError> {
    validate_recommendation_config(&config.recommendations)?;
    validate_cache_config(&config.cache)?;
    validate_training_config(&config.training)?;
    Ok(())
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::ValidationError(message.to_string())
}

fn validate_recommendation_config(config: &RecommendationConfig) -> Result<(), ConfigError> {
    if config.default_limit == 0 {
        return Err(invalid("default_limit must be greater than 0"));
    }
    if config.max_limit < config.default_limit {
        return Err(invalid("max_limit must be at least default_limit"));
    }
    if config.provider_timeout.is_zero() {
        return Err(invalid("provider_timeout must be greater than 0"));
    }
    Ok(())
}

fn validate_cache_config(config: &CacheConfig) -> Result<(), ConfigError> {
    if config.ttl.is_zero() {
        return Err(invalid("cache ttl must be greater than 0"));
    }

    match config.backend {
        CacheBackend::Memory => {
            if config.capacity == 0 {
                return Err(invalid("cache capacity must be greater than 0"));
            }
        }
        CacheBackend::Redis => {
            if config
                .redis_url
                .as_deref()
                .is_none_or(|url| url.trim().is_empty())
            {
                return Err(invalid("redis_url is required for the redis cache backend"));
            }
        }
    }

    Ok(())
}

fn validate_training_config(config: &TrainingConfig) -> Result<(), ConfigError> {
    if config.model_dir.as_os_str().is_empty() {
        return Err(invalid("Model directory cannot be empty"));
    }
    if config.artifact_name.trim().is_empty() {
        return Err(invalid("artifact_name cannot be empty"));
    }
    if config.neighbors == 0 {
        return Err(invalid("neighbors must be greater than 0"));
    }
    if config.schedule_enabled && config.retrain_interval.is_zero() {
        return Err(invalid("retrain_interval must be greater than 0"));
    }
    Ok(())
}
