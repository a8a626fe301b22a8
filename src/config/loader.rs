//! Configuration loading and merging logic
//!
//! Handles loading configuration from a YAML file with environment variable
//! overrides layered on top.

use super::{defaults, paths, schema::Config};
use anyhow::{Context, Result};
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration
    ///
    /// Precedence order (highest to lowest):
    /// 1. Environment variable overrides (`DRIFTWATCH_*`)
    /// 2. Config file (explicit path, or the platform config path)
    /// 3. Built-in defaults
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let mut config = match path {
            Some(p) => Self::load_file(p)?,
            None => {
                let default_path = paths::root_config_path();
                if default_path.exists() {
                    Self::load_file(&default_path)?
                } else {
                    Self::load_defaults()
                }
            }
        };

        config = Self::apply_env_overrides(config);
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration by loading and checking for errors
    pub fn validate(path: Option<&Path>) -> Result<()> {
        let config = Self::load(path).context("Failed to load configuration")?;

        if config.worker_pool_size == 0 {
            return Err(anyhow::anyhow!("workerPoolSize must be at least 1"));
        }
        if config.connect_timeout_secs >= config.session_timeout_secs {
            return Err(anyhow::anyhow!(
                "connectTimeoutSecs ({}) must be shorter than sessionTimeoutSecs ({})",
                config.connect_timeout_secs,
                config.session_timeout_secs
            ));
        }

        Ok(())
    }

    /// Load default configuration
    pub fn load_defaults() -> Config {
        defaults::default_config()
    }

    /// Save configuration to the root config path
    pub fn save_root(config: &Config) -> Result<()> {
        let path = paths::root_config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let yaml = serde_yaml::to_string(config).context("Failed to serialize configuration")?;
        std::fs::write(&path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: Config) -> Config {
        if let Ok(url) = std::env::var("DRIFTWATCH_SERVICE_URL") {
            config.service_url = url;
        }

        if let Ok(role) = std::env::var("DRIFTWATCH_DEVICE_ROLE") {
            config.device_role = role;
        }

        if let Ok(size) = std::env::var("DRIFTWATCH_WORKER_POOL_SIZE") {
            if let Ok(size) = size.parse() {
                config.worker_pool_size = size;
            }
        }

        if let Ok(dir) = std::env::var("DRIFTWATCH_REPORT_DIR") {
            config.report.dir = dir;
        }

        config
    }
}
