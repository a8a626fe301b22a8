//! Shared fakes for integration tests
//!
//! Hand-rolled scripted implementations of the engine's collaborator traits.
//! Every behavior is declared up front per container, so tests stay
//! deterministic without touching the network or a container runtime.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use driftwatch::config::ConfigLoader;
use driftwatch::inventory::{ApiStatus, InventoryClient, InventoryError};
use driftwatch::models::{Device, IntendedState};
use driftwatch::supervisor::{
    ContainerStatus, ExecOutput, SupervisorClient, SupervisorError, SystemStatus,
};
use driftwatch::Config;

/// `ip addr show` output for a healthy router: loopback up with an assigned
/// address, one fabric-facing interface.
pub const HEALTHY_IP_ADDR: &str = "\
1: lo: <LOOPBACK,UP,LOWER_UP> mtu 65536 qdisc noqueue state UNKNOWN group default qlen 1000
    link/loopback 00:00:00:00:00:00 brd 00:00:00:00:00:00
    inet 127.0.0.1/8 scope host lo
       valid_lft forever preferred_lft forever
    inet 1.1.1.1/32 scope global lo
       valid_lft forever preferred_lft forever
2: eth0@if24: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500 qdisc noqueue state UP group default
    link/ether aa:c1:ab:00:00:02 brd ff:ff:ff:ff:ff:ff
    inet 172.20.20.2/24 brd 172.20.20.255 scope global eth0
       valid_lft forever preferred_lft forever
";

/// Output for a router whose loopback was never configured.
pub const NO_LOOPBACK_IP_ADDR: &str = "\
2: eth0@if24: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500 qdisc noqueue state UP group default
    link/ether aa:c1:ab:00:00:03 brd ff:ff:ff:ff:ff:ff
    inet 172.20.20.3/24 brd 172.20.20.255 scope global eth0
       valid_lft forever preferred_lft forever
";

/// Default configuration with a given worker pool size and no run deadline.
pub fn test_config(pool: usize) -> Config {
    let mut config = ConfigLoader::load_defaults();
    config.worker_pool_size = pool;
    config
}

/// Scripted inventory: a fixed device list plus per-name declared state.
pub struct FakeInventory {
    pub devices: Vec<Device>,
    pub intents: HashMap<String, IntendedState>,
    pub status_up: bool,
}

impl FakeInventory {
    pub fn new(devices: Vec<Device>) -> Self {
        Self {
            devices,
            intents: HashMap::new(),
            status_up: true,
        }
    }

    pub fn with_intent(mut self, intent: IntendedState) -> Self {
        self.intents.insert(intent.device_name.clone(), intent);
        self
    }

    pub fn with_status_down(mut self) -> Self {
        self.status_up = false;
        self
    }
}

#[async_trait]
impl InventoryClient for FakeInventory {
    async fn devices_by_role(&self, _role: &str) -> Result<Vec<Device>, InventoryError> {
        Ok(self.devices.clone())
    }

    async fn device_by_name(&self, name: &str) -> Result<Option<IntendedState>, InventoryError> {
        Ok(self.intents.get(name).cloned())
    }

    async fn status(&self) -> Result<ApiStatus, InventoryError> {
        if self.status_up {
            Ok(ApiStatus {
                version: "4.0.5".to_string(),
                device_count: self.devices.len() as u64,
                latency_ms: 3,
            })
        } else {
            Err(InventoryError::Request("connection refused".to_string()))
        }
    }
}

/// What a scripted container answers to an exec call.
#[derive(Clone)]
pub enum ExecScript {
    /// Successful run producing the given stdout.
    Stdout(&'static str),
    /// Non-zero exit with the given code and stderr.
    Exit(i32, &'static str),
    /// The supervisor call itself fails.
    Broken,
}

/// Scripted supervisor: per-container addresses, exec behavior, and
/// lifecycle state. Unknown containers behave like missing ones.
pub struct FakeSupervisor {
    pub addresses: HashMap<String, String>,
    pub execs: HashMap<String, ExecScript>,
    pub statuses: HashMap<String, ContainerStatus>,
    /// Simulated per-exec latency derived from the container name.
    pub jitter: bool,
    /// Fixed per-exec latency, applied before any jitter.
    pub delay: Option<Duration>,
}

impl FakeSupervisor {
    pub fn new() -> Self {
        Self {
            addresses: HashMap::new(),
            execs: HashMap::new(),
            statuses: HashMap::new(),
            jitter: false,
            delay: None,
        }
    }

    pub fn with_address(mut self, container: &str, address: &str) -> Self {
        self.addresses
            .insert(container.to_string(), address.to_string());
        self
    }

    pub fn with_exec(mut self, container: &str, script: ExecScript) -> Self {
        self.execs.insert(container.to_string(), script);
        self
    }

    pub fn with_status(mut self, container: &str, status: ContainerStatus) -> Self {
        self.statuses.insert(container.to_string(), status);
        self
    }

    pub fn with_jitter(mut self) -> Self {
        self.jitter = true;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn latency_for(&self, container: &str) -> Duration {
        // Cheap stable hash; spreads workers over 1..=20ms.
        let sum: u64 = container.bytes().map(u64::from).sum();
        Duration::from_millis(sum % 20 + 1)
    }
}

#[async_trait]
impl SupervisorClient for FakeSupervisor {
    async fn inspect_address(&self, container: &str) -> Result<Option<String>, SupervisorError> {
        Ok(self.addresses.get(container).cloned())
    }

    async fn exec(&self, container: &str, _command: &str) -> Result<ExecOutput, SupervisorError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.jitter {
            tokio::time::sleep(self.latency_for(container)).await;
        }
        match self.execs.get(container) {
            Some(ExecScript::Stdout(stdout)) => Ok(ExecOutput {
                stdout: stdout.to_string(),
                stderr: String::new(),
                exit_code: 0,
            }),
            Some(ExecScript::Exit(code, stderr)) => Ok(ExecOutput {
                stdout: String::new(),
                stderr: stderr.to_string(),
                exit_code: *code,
            }),
            Some(ExecScript::Broken) => {
                Err(SupervisorError::Command("exec transport failed".to_string()))
            }
            None => Err(SupervisorError::Command(format!(
                "no such container: {container}"
            ))),
        }
    }

    async fn container_status(
        &self,
        container: &str,
    ) -> Result<ContainerStatus, SupervisorError> {
        Ok(self
            .statuses
            .get(container)
            .copied()
            .unwrap_or(ContainerStatus::Running))
    }

    async fn system_status(&self) -> Result<SystemStatus, SupervisorError> {
        let running = self
            .statuses
            .values()
            .filter(|s| **s == ContainerStatus::Running)
            .count() as u64;
        let total = self.statuses.len() as u64;
        Ok(SystemStatus {
            containers_running: running.max(1),
            containers_total: total.max(1),
            server_version: "27.0.3".to_string(),
        })
    }
}
