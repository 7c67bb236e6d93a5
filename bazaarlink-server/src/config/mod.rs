//! Server configuration module

use anyhow::{Context, Result};
use bazaarlink::config::{BazaarConfig, ConfigLoader};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Maximum request body size in bytes
    pub max_request_size: usize,

    /// Engine configuration file; the default locations are searched when unset
    pub config_file_path: Option<PathBuf>,

    /// Catalog snapshot loaded at startup
    pub catalog_path: Option<PathBuf>,

    /// Overrides `training.model_dir` of the engine configuration
    pub model_dir: Option<PathBuf>,

    /// Train a similarity model in the background right after startup
    pub retrain_on_start: bool,

    /// Log level taking precedence over the engine configuration
    pub log_level: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            max_request_size: 1024 * 1024, // 1MB
            config_file_path: None,
            catalog_path: None,
            model_dir: None,
            retrain_on_start: false,
            log_level: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from CLI arguments and environment variables
    /// CLI arguments take precedence over environment variables
    pub fn from_cli_and_env(cli_args: crate::cli::CliArgs) -> Result<Self> {
        Self::from_cli_and_lookup(cli_args, |key| env::var(key).ok())
    }

    /// Same as [`Self::from_cli_and_env`] with an explicit variable source
    pub fn from_cli_and_lookup<F>(cli_args: crate::cli::CliArgs, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = cli_args.port {
            config.port = port;
        } else if let Some(port) = lookup("BAZAARLINK_PORT") {
            config.port = port.parse().context("invalid BAZAARLINK_PORT")?;
        }

        if let Some(max_size) = cli_args.max_request_size {
            config.max_request_size = max_size;
        } else if let Some(max_size) = lookup("BAZAARLINK_MAX_REQUEST_SIZE") {
            config.max_request_size = max_size
                .parse()
                .context("invalid BAZAARLINK_MAX_REQUEST_SIZE")?;
        }

        config.config_file_path = cli_args
            .config_file
            .or_else(|| lookup("BAZAARLINK_CONFIG_FILE").map(PathBuf::from));

        config.catalog_path = cli_args
            .catalog
            .or_else(|| lookup("BAZAARLINK_CATALOG").map(PathBuf::from));

        config.model_dir = cli_args.model_dir;

        if let Some(retrain) = cli_args.retrain_on_start {
            config.retrain_on_start = retrain;
        } else if let Some(retrain) = lookup("BAZAARLINK_RETRAIN_ON_START") {
            config.retrain_on_start = retrain.parse().unwrap_or(false);
        }

        config.log_level = cli_args.log_level;

        Ok(config)
    }

    /// Engine configuration: defaults, then the configuration file, then
    /// `BAZAARLINK_*` variables, then CLI overrides
    pub fn engine_config(&self) -> Result<BazaarConfig> {
        let mut loader = ConfigLoader::new();
        match &self.config_file_path {
            Some(path) => {
                loader.load_file(path).with_context(|| {
                    format!("failed to load configuration file {}", path.display())
                })?;
            }
            None => {
                loader.load_default_files();
            }
        }
        loader.load_env();

        let mut config = loader.extract().context("invalid engine configuration")?;
        if let Some(model_dir) = &self.model_dir {
            config.training.model_dir = model_dir.clone();
        }
        Ok(config)
    }
}
