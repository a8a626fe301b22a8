//! Docker CLI supervisor implementation
//!
//! Shells out to the `docker` binary with a bounded timeout per call.
//! Indirect command execution gets its own (longer) budget than the cheap
//! inspection calls.

use super::{ContainerStatus, ExecOutput, SupervisorClient, SupervisorError, SystemStatus};
use async_trait::async_trait;
use serde::Deserialize;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

const INSPECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Supervisor client driving the `docker` CLI.
pub struct DockerCli {
    exec_timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct DockerSystemInfo {
    #[serde(rename = "ContainersRunning", default)]
    containers_running: u64,
    #[serde(rename = "Containers", default)]
    containers_total: u64,
    #[serde(rename = "ServerVersion", default)]
    server_version: String,
}

impl DockerCli {
    /// Create a client. `exec_timeout` bounds indirect command execution;
    /// inspection calls use a fixed 10s budget.
    pub fn new(exec_timeout: Duration) -> Self {
        Self { exec_timeout }
    }

    async fn run(&self, args: &[&str], timeout: Duration) -> Result<Output, SupervisorError> {
        let child = Command::new("docker")
            .args(args)
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(timeout, child).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(SupervisorError::Spawn(e.to_string())),
            Err(_) => Err(SupervisorError::Timeout(timeout)),
        }
    }
}

#[async_trait]
impl SupervisorClient for DockerCli {
    async fn inspect_address(&self, container: &str) -> Result<Option<String>, SupervisorError> {
        let output = self
            .run(
                &[
                    "inspect",
                    "-f",
                    "{{range .NetworkSettings.Networks}}{{.IPAddress}}{{end}}",
                    container,
                ],
                INSPECT_TIMEOUT,
            )
            .await?;

        if !output.status.success() {
            return Err(SupervisorError::Command(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let address = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if address.is_empty() {
            Ok(None)
        } else {
            Ok(Some(address))
        }
    }

    async fn exec(&self, container: &str, command: &str) -> Result<ExecOutput, SupervisorError> {
        let output = self
            .run(&["exec", container, "sh", "-c", command], self.exec_timeout)
            .await?;

        Ok(ExecOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }

    async fn container_status(
        &self,
        container: &str,
    ) -> Result<ContainerStatus, SupervisorError> {
        let output = self
            .run(
                &["inspect", "-f", "{{.State.Status}}", container],
                INSPECT_TIMEOUT,
            )
            .await?;

        if !output.status.success() {
            // Docker reports missing containers as an inspect error.
            return Ok(ContainerStatus::NotFound);
        }

        match String::from_utf8_lossy(&output.stdout).trim() {
            "running" => Ok(ContainerStatus::Running),
            _ => Ok(ContainerStatus::Stopped),
        }
    }

    async fn system_status(&self) -> Result<SystemStatus, SupervisorError> {
        let output = self
            .run(&["system", "info", "--format", "json"], INSPECT_TIMEOUT)
            .await?;

        if !output.status.success() {
            return Err(SupervisorError::Command(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let info: DockerSystemInfo = serde_json::from_slice(&output.stdout)
            .map_err(|e| SupervisorError::Command(format!("unparseable system info: {e}")))?;

        Ok(SystemStatus {
            containers_running: info.containers_running,
            containers_total: info.containers_total,
            server_version: info.server_version,
        })
    }
}
