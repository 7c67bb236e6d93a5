//! Configuration model definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Main configuration structure for BazaarLink.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct BazaarConfig {
    /// Request handling
    pub recommendations: RecommendationConfig,

    /// Recommendation cache
    pub cache: CacheConfig,

    /// Similarity model training
    pub training: TrainingConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Request handling settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecommendationConfig {
    /// List length when the caller does not ask for one
    pub default_limit: usize,

    /// Largest list a caller may ask for
    pub max_limit: usize,

    /// Budget for each signal and for each cache call
    #[serde(with = "humantime_serde")]
    pub provider_timeout: Duration,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
            provider_timeout: Duration::from_secs(2),
        }
    }
}

/// Cache backend selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Process-local LRU
    Memory,

    /// Shared Redis instance (requires the `redis-cache` feature)
    Redis,
}

/// Recommendation cache settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackend,

    /// Lifetime of a cached list
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,

    /// Maximum entries of the memory backend
    pub capacity: usize,

    /// Connection URL of the redis backend
    pub redis_url: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            ttl: Duration::from_secs(1800),
            capacity: 10_000,
            redis_url: None,
        }
    }
}

/// Similarity model training settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrainingConfig {
    /// Directory holding published artifacts
    pub model_dir: PathBuf,

    /// Name the similarity table is published under
    pub artifact_name: String,

    /// Neighbours kept per user
    pub neighbors: usize,

    /// Whether to retrain on a timer
    pub schedule_enabled: bool,

    /// Time between scheduled runs
    #[serde(with = "humantime_serde")]
    pub retrain_interval: Duration,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("./models"),
            artifact_name: "user_similarity".to_string(),
            neighbors: 10,
            schedule_enabled: false,
            retrain_interval: Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,

    /// Log format
    pub format: LogFormat,

    /// File to log to (if any)
    pub file: Option<PathBuf>,

    /// Whether to log to stdout
    pub stdout: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Default,
            file: None,
            stdout: true,
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Default format
    Default,

    /// JSON format
    Json,

    /// Compact format
    Compact,

    /// Pretty format
    Pretty,
}
