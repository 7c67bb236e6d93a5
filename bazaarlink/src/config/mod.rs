//! Configuration system for BazaarLink.
//!
//! Configuration is layered: built-in defaults, then an optional file
//! (TOML, YAML or JSON), then `BAZAARLINK_` environment variables where `__`
//! separates nested keys (`BAZAARLINK_CACHE__TTL=10m`).

mod builder;
mod loader;
mod models;
mod validation;

pub use builder::ConfigBuilder;
pub use loader::ConfigLoader;
pub use models::*;
pub use validation::validate_config;

/// Default configuration file names that the system will look for
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    "bazaarlink.toml",
    "bazaarlink.yaml",
    "bazaarlink.yml",
    "bazaarlink.json",
    ".bazaarlink/config.toml",
    ".bazaarlink/config.yaml",
    ".bazaarlink/config.yml",
    ".bazaarlink/config.json",
];

/// Environment variable prefix for BazaarLink configuration
pub const ENV_PREFIX: &str = "BAZAARLINK_";

/// Separator for nested keys in environment variable names
pub const ENV_SEPARATOR: &str = "__";

/// Configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error occurred during file loading
    #[error("Failed to load configuration file: {0}")]
    FileLoadError(String),

    /// Error occurred during validation
    #[error("Configuration validation error: {0}")]
    ValidationError(String),

    /// Error occurred during parsing
    #[error("Configuration parsing error: {0}")]
    ParseError(String),
}

impl From<ConfigError> for crate::BazaarError {
    fn from(err: ConfigError) -> Self {
        crate::BazaarError::Configuration(err.to_string())
    }
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
