//! Configuration management
//!
//! YAML configuration file with built-in defaults and environment variable
//! overrides.

pub mod defaults;
pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::Config;

use anyhow::{Context, Result};

/// Get a configuration value by key (dot notation)
pub fn get_config_value(config: &Config, key: &str) -> Result<String> {
    match key {
        "serviceUrl" => Ok(config.service_url.clone()),
        "authTokenEnv" => Ok(config.auth_token_env.clone()),
        "deviceRole" => Ok(config.device_role.clone()),
        "workerPoolSize" => Ok(config.worker_pool_size.to_string()),
        "connectTimeoutSecs" => Ok(config.connect_timeout_secs.to_string()),
        "sessionTimeoutSecs" => Ok(config.session_timeout_secs.to_string()),
        "execTimeoutSecs" => Ok(config.exec_timeout_secs.to_string()),
        "runDeadlineSecs" => Ok(config
            .run_deadline_secs
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unset".to_string())),
        "device.username" => Ok(config.device.username.clone()),
        "device.passwordEnv" => Ok(config.device.password_env.clone()),
        "device.sshPort" => Ok(config.device.ssh_port.to_string()),
        "report.dir" => Ok(config.report.dir.clone()),
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}

/// Set a configuration value by key (dot notation)
pub fn set_config_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "serviceUrl" => {
            config.service_url = value.to_string();
        }
        "authTokenEnv" => {
            config.auth_token_env = value.to_string();
        }
        "deviceRole" => {
            config.device_role = value.to_string();
        }
        "workerPoolSize" => {
            config.worker_pool_size =
                value.parse().context("workerPoolSize must be a number")?;
        }
        "connectTimeoutSecs" => {
            config.connect_timeout_secs = value
                .parse()
                .context("connectTimeoutSecs must be a number")?;
        }
        "sessionTimeoutSecs" => {
            config.session_timeout_secs = value
                .parse()
                .context("sessionTimeoutSecs must be a number")?;
        }
        "execTimeoutSecs" => {
            config.exec_timeout_secs =
                value.parse().context("execTimeoutSecs must be a number")?;
        }
        "runDeadlineSecs" => {
            config.run_deadline_secs = if value == "unset" {
                None
            } else {
                Some(value.parse().context("runDeadlineSecs must be a number")?)
            };
        }
        "device.username" => {
            config.device.username = value.to_string();
        }
        "device.passwordEnv" => {
            config.device.password_env = value.to_string();
        }
        "device.sshPort" => {
            config.device.ssh_port = value.parse().context("device.sshPort must be a port")?;
        }
        "report.dir" => {
            config.report.dir = value.to_string();
        }
        _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }

    Ok(())
}
