//! Configuration loader.

use super::{
    ConfigError, DEFAULT_CONFIG_FILES, ENV_PREFIX, ENV_SEPARATOR, Result, models::*, validation,
};
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
};
use std::path::{Path, PathBuf};

/// Configuration loader that merges defaults, files, and the environment.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    figment: Figment,
}

impl ConfigLoader {
    /// Create a new configuration loader with default values.
    pub fn new() -> Self {
        let figment = Figment::new().merge(Serialized::defaults(BazaarConfig::default()));
        Self { figment }
    }

    /// Load configuration from a file.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<&mut Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileLoadError(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(self.merge(Toml::file(path))),
            Some("yaml") | Some("yml") => Ok(self.merge(Yaml::file(path))),
            Some("json") => Ok(self.merge(Json::file(path))),
            _ => Err(ConfigError::FileLoadError(format!(
                "Unsupported file format: {}",
                path.display()
            ))),
        }
    }

    /// Load the first configuration file found in the working directory or
    /// the user's config directory.
    pub fn load_default_files(&mut self) -> &mut Self {
        let mut candidates: Vec<PathBuf> = DEFAULT_CONFIG_FILES.iter().map(PathBuf::from).collect();
        if let Some(proj_dirs) = directories::ProjectDirs::from("org", "bazaarlink", "bazaarlink") {
            let config_dir = proj_dirs.config_dir();
            candidates.extend(
                ["toml", "yaml", "yml", "json"]
                    .iter()
                    .map(|ext| config_dir.join(format!("config.{}", ext))),
            );
        }

        for path in candidates {
            if path.exists() && self.load_file(&path).is_ok() {
                tracing::debug!("Loaded configuration from {}", path.display());
                break;
            }
        }

        self
    }

    /// Load configuration from `BAZAARLINK_*` environment variables.
    pub fn load_env(&mut self) -> &mut Self {
        let figment = std::mem::take(&mut self.figment)
            .merge(Env::prefixed(ENV_PREFIX).split(ENV_SEPARATOR));
        self.figment = figment;
        self
    }

    /// Load configuration from a custom source.
    pub fn merge<T: figment::Provider>(&mut self, provider: T) -> &mut Self {
        let figment = std::mem::take(&mut self.figment).merge(provider);
        self.figment = figment;
        self
    }

    /// Extract and validate the configuration.
    pub fn extract(&self) -> Result<BazaarConfig> {
        let config: BazaarConfig = self
            .figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        validation::validate_config(&config)?;

        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
