//! Built-in default configuration

use super::schema::{Config, config_with_defaults};

/// Default configuration used when no config file exists
pub fn default_config() -> Config {
    config_with_defaults()
}
