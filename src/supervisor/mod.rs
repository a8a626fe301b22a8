//! Backing supervisor access
//!
//! The supervisor is the container subsystem hosting each device's execution
//! environment. The engine uses it for address inspection, indirect command
//! execution, and health checks. Non-zero exits and timeouts are normal,
//! expected outcomes here, not exceptional ones.

mod docker;

pub use docker::DockerCli;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by supervisor calls.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The supervisor command did not complete within its budget.
    #[error("supervisor command timed out after {0:?}")]
    Timeout(Duration),

    /// The supervisor binary could not be invoked at all.
    #[error("failed to invoke supervisor: {0}")]
    Spawn(String),

    /// The supervisor ran but reported a failure the caller cannot act on.
    #[error("supervisor command failed: {0}")]
    Command(String),
}

/// Captured output of an indirect command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Lifecycle state of a backing container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerStatus {
    Running,
    Stopped,
    NotFound,
}

impl std::fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
            Self::NotFound => write!(f, "not found"),
        }
    }
}

/// Aggregate container-subsystem counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemStatus {
    pub containers_running: u64,
    pub containers_total: u64,
    pub server_version: String,
}

/// Capability set the engine needs from the container subsystem.
#[async_trait]
pub trait SupervisorClient: Send + Sync {
    /// Current network address of a container, or `None` when it has none.
    async fn inspect_address(&self, container: &str) -> Result<Option<String>, SupervisorError>;

    /// Run a shell command inside a container.
    async fn exec(&self, container: &str, command: &str) -> Result<ExecOutput, SupervisorError>;

    /// Lifecycle state of a container.
    async fn container_status(&self, container: &str)
    -> Result<ContainerStatus, SupervisorError>;

    /// Subsystem-wide running/total counts.
    async fn system_status(&self) -> Result<SystemStatus, SupervisorError>;
}
