//! Configuration schema definitions
//!
//! Defines the structure of the configuration file using serde for
//! serialization.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Base URL of the inventory (source-of-truth) service
    #[serde(default = "default_service_url")]
    pub service_url: String,

    /// Environment variable holding the inventory API token
    #[serde(default = "default_auth_token_env")]
    pub auth_token_env: String,

    /// Inventory role used to discover devices when none are given explicitly
    #[serde(default = "default_device_role")]
    pub device_role: String,

    /// Maximum number of concurrent device workers
    #[serde(default = "default_worker_pool_size")]
    pub worker_pool_size: usize,

    /// Direct-transport connect timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Direct-transport session timeout in seconds
    #[serde(default = "default_session_timeout_secs")]
    pub session_timeout_secs: u64,

    /// Indirect (supervisor exec) timeout in seconds
    #[serde(default = "default_exec_timeout_secs")]
    pub exec_timeout_secs: u64,

    /// Optional whole-run deadline in seconds. On expiry, still-running
    /// device workers are recorded as Unreachable rather than dropped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_deadline_secs: Option<u64>,

    /// Device access configuration
    #[serde(default)]
    pub device: DeviceAccessConfig,

    /// Report persistence configuration
    #[serde(default)]
    pub report: ReportConfig,
}

/// Credentials and port used for direct device sessions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceAccessConfig {
    /// SSH username
    #[serde(default = "default_username")]
    pub username: String,

    /// Environment variable holding the SSH password. If the variable is
    /// unset, transport resolution downgrades to the indirect path.
    #[serde(default = "default_password_env")]
    pub password_env: String,

    /// SSH port
    #[serde(default = "default_ssh_port")]
    pub ssh_port: u16,
}

/// Report persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportConfig {
    /// Directory timestamped report files are written to
    #[serde(default = "default_report_dir")]
    pub dir: String,
}

impl Config {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout_secs)
    }

    pub fn exec_timeout(&self) -> Duration {
        Duration::from_secs(self.exec_timeout_secs)
    }

    pub fn run_deadline(&self) -> Option<Duration> {
        self.run_deadline_secs.map(Duration::from_secs)
    }
}

impl Default for DeviceAccessConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
            password_env: default_password_env(),
            ssh_port: default_ssh_port(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            dir: default_report_dir(),
        }
    }
}

// Default value functions
fn default_service_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_auth_token_env() -> String {
    "DRIFTWATCH_API_TOKEN".to_string()
}

fn default_device_role() -> String {
    "router".to_string()
}

fn default_worker_pool_size() -> usize {
    4
}

fn default_connect_timeout_secs() -> u64 {
    20
}

fn default_session_timeout_secs() -> u64 {
    60
}

fn default_exec_timeout_secs() -> u64 {
    30
}

fn default_username() -> String {
    "root".to_string()
}

fn default_password_env() -> String {
    "DRIFTWATCH_DEVICE_PASSWORD".to_string()
}

fn default_ssh_port() -> u16 {
    22
}

fn default_report_dir() -> String {
    ".".to_string()
}

pub(super) fn config_with_defaults() -> Config {
    Config {
        service_url: default_service_url(),
        auth_token_env: default_auth_token_env(),
        device_role: default_device_role(),
        worker_pool_size: default_worker_pool_size(),
        connect_timeout_secs: default_connect_timeout_secs(),
        session_timeout_secs: default_session_timeout_secs(),
        exec_timeout_secs: default_exec_timeout_secs(),
        run_deadline_secs: None,
        device: DeviceAccessConfig::default(),
        report: ReportConfig::default(),
    }
}
