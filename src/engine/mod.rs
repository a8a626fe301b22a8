//! Concurrent reconciliation orchestrator
//!
//! Runs infrastructure checks first, then one bounded worker per device.
//! Workers never propagate errors: every failure path lands in the shared
//! result store as a typed outcome, and a run always returns a store,
//! degraded as needed.

mod store;

pub use store::{INFRASTRUCTURE_KEY, ResultStore, StoreSnapshot};

use crate::collector::Collector;
use crate::comparator::Comparator;
use crate::config::Config;
use crate::inventory::{InventoryClient, InventoryError};
use crate::models::{
    CheckOutcome, ConnectionMethod, ConnectionOutcome, Device, InfrastructureReport,
    IntendedState, ValidationResult, ValidationStatus,
};
use crate::supervisor::{ContainerStatus, SupervisorClient};
use crate::transport::TransportResolver;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Command used by monitor mode to probe the exec channel.
const EXEC_PROBE_COMMAND: &str = "echo driftwatch-probe";

/// Device state reconciliation engine with injected collaborators.
#[derive(Clone)]
pub struct ReconciliationEngine {
    config: Config,
    inventory: Arc<dyn InventoryClient>,
    supervisor: Arc<dyn SupervisorClient>,
    resolver: TransportResolver,
    comparator: Comparator,
}

impl ReconciliationEngine {
    pub fn new(
        config: Config,
        inventory: Arc<dyn InventoryClient>,
        supervisor: Arc<dyn SupervisorClient>,
    ) -> Self {
        let resolver = TransportResolver::from_config(&config);
        Self {
            config,
            inventory,
            supervisor,
            resolver,
            comparator: Comparator::new(),
        }
    }

    /// Replace the default comparator (e.g. to enable field checks).
    pub fn with_comparator(mut self, comparator: Comparator) -> Self {
        self.comparator = comparator;
        self
    }

    /// Replace the default transport resolver.
    pub fn with_resolver(mut self, resolver: TransportResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Discover devices from the inventory by the configured role.
    pub async fn discover_devices(&self) -> Result<Vec<Device>, InventoryError> {
        self.inventory
            .devices_by_role(&self.config.device_role)
            .await
    }

    /// Validate every given device against its declared state.
    ///
    /// Always returns a store with exactly one entry per device plus the
    /// reserved infrastructure entry, even when everything fails.
    pub async fn run(&self, devices: Vec<Device>) -> ResultStore {
        self.run_workers(devices, WorkerMode::Validate).await
    }

    /// Health-check every given device through the supervisor only.
    pub async fn monitor(&self, devices: Vec<Device>) -> ResultStore {
        self.run_workers(devices, WorkerMode::Monitor).await
    }

    async fn run_workers(&self, devices: Vec<Device>, mode: WorkerMode) -> ResultStore {
        let store = ResultStore::new();

        // Infrastructure first, synchronously. A down inventory or container
        // subsystem is recorded but does not block per-device attempts.
        self.check_infrastructure(&store).await;

        let semaphore = Arc::new(Semaphore::new(self.config.worker_pool_size.max(1)));

        let mut handles: Vec<(String, JoinHandle<()>)> = Vec::with_capacity(devices.len());
        for device in devices {
            let engine = self.clone();
            let store = store.clone();
            let semaphore = semaphore.clone();
            let name = device.name.clone();

            let handle = tokio::spawn(async move {
                // Closed semaphore cannot happen here; treat it like a full pool.
                let _permit = semaphore.acquire().await;
                let result = match mode {
                    WorkerMode::Validate => engine.validate_device(&device).await,
                    WorkerMode::Monitor => engine.monitor_device(&device).await,
                };
                tracing::info!("{}: {}", result.device, result.status);
                store.insert(result);
            });
            handles.push((name, handle));
        }

        let join_all = async {
            for (name, handle) in &mut handles {
                if let Err(e) = handle.await {
                    // A panicked worker must not take its siblings down; it
                    // becomes an Unreachable entry like any other failure.
                    tracing::error!("worker for {name} failed: {e}");
                    store.insert(ValidationResult::unreachable(
                        name,
                        ConnectionMethod::ContainerExec,
                        format!("worker failed: {e}"),
                    ));
                }
            }
        };

        match self.config.run_deadline() {
            Some(deadline) => {
                if tokio::time::timeout(deadline, join_all).await.is_err() {
                    tracing::warn!("run deadline of {deadline:?} expired");
                    for (name, handle) in &handles {
                        handle.abort();
                        if !store.contains(name) {
                            store.insert(ValidationResult::unreachable(
                                name,
                                ConnectionMethod::ContainerExec,
                                format!("run deadline of {}s exceeded", deadline.as_secs()),
                            ));
                        }
                    }
                }
            }
            None => join_all.await,
        }

        store
    }

    /// Validate one device: fetch intent, resolve transport, collect, compare.
    async fn validate_device(&self, device: &Device) -> ValidationResult {
        let intended = match self.inventory.device_by_name(&device.name).await {
            Ok(Some(intended)) => intended,
            Ok(None) => {
                tracing::warn!("{} is not declared in the inventory", device.name);
                IntendedState::unknown(&device.name)
            }
            Err(e) => {
                // Inventory trouble must not hide a reachable device.
                tracing::warn!("intended state fetch for {} failed: {e}", device.name);
                IntendedState::unknown(&device.name)
            }
        };

        let transport = self.resolver.resolve(device, &*self.supervisor).await;
        let collector = Collector::new(self.supervisor.clone());
        let actual = collector.collect(device, &transport).await;

        self.comparator.compare(&device.name, &intended, &actual)
    }

    /// Health-check one device through the supervisor: container lifecycle,
    /// exec probe, address presence.
    async fn monitor_device(&self, device: &Device) -> ValidationResult {
        let mut checks = BTreeMap::new();

        let container_status = match self.supervisor.container_status(&device.container).await {
            Ok(status) => status,
            Err(e) => {
                return ValidationResult::unreachable(
                    &device.name,
                    ConnectionMethod::ContainerExec,
                    format!("container status check failed: {e}"),
                );
            }
        };

        if container_status != ContainerStatus::Running {
            checks.insert(
                "container".to_string(),
                CheckOutcome::new(container_status.to_string()),
            );
            checks.insert(
                "exec_probe".to_string(),
                CheckOutcome::with_detail("skipped", "container not running"),
            );
            let mut result = ValidationResult::unreachable(
                &device.name,
                ConnectionMethod::ContainerExec,
                format!("container {} is {container_status}", device.container),
            );
            result.checks = checks;
            return result;
        }

        checks.insert("container".to_string(), CheckOutcome::new("running"));

        // Address presence is informational; a container without an address
        // is still reachable through exec.
        let address = self
            .supervisor
            .inspect_address(&device.container)
            .await
            .ok()
            .flatten();
        checks.insert(
            "address".to_string(),
            match &address {
                Some(addr) => CheckOutcome::with_detail("present", addr.clone()),
                None => CheckOutcome::new("absent"),
            },
        );

        match self.supervisor.exec(&device.container, EXEC_PROBE_COMMAND).await {
            Ok(output) if output.success() => {
                checks.insert("exec_probe".to_string(), CheckOutcome::new("success"));
                ValidationResult {
                    device: device.name.clone(),
                    status: ValidationStatus::Passed,
                    connection: ConnectionOutcome::Connected,
                    method: ConnectionMethod::ContainerExec,
                    error: None,
                    checks,
                    intended_state: None,
                    actual_state: None,
                    validated_at: Utc::now(),
                }
            }
            Ok(output) => {
                let detail = if output.stderr.trim().is_empty() {
                    format!("exit status {}", output.exit_code)
                } else {
                    output.stderr.trim().to_string()
                };
                checks.insert(
                    "exec_probe".to_string(),
                    CheckOutcome::with_detail("failed", detail.clone()),
                );
                let mut result = ValidationResult::unreachable(
                    &device.name,
                    ConnectionMethod::ContainerExec,
                    format!("exec probe failed: {detail}"),
                );
                result.checks = checks;
                result
            }
            Err(e) => {
                checks.insert(
                    "exec_probe".to_string(),
                    CheckOutcome::with_detail("failed", e.to_string()),
                );
                let mut result = ValidationResult::unreachable(
                    &device.name,
                    ConnectionMethod::ContainerExec,
                    format!("exec probe failed: {e}"),
                );
                result.checks = checks;
                result
            }
        }
    }

    /// Probe the inventory service and the container subsystem, recording
    /// both under the reserved store key.
    async fn check_infrastructure(&self, store: &ResultStore) {
        let mut checks = BTreeMap::new();

        let inventory_up = match self.inventory.status().await {
            Ok(status) => {
                checks.insert(
                    "inventory_api".to_string(),
                    CheckOutcome::with_detail(
                        "up",
                        format!(
                            "version {}, {} devices, {}ms",
                            status.version, status.device_count, status.latency_ms
                        ),
                    ),
                );
                true
            }
            Err(e) => {
                checks.insert(
                    "inventory_api".to_string(),
                    CheckOutcome::with_detail("down", e.to_string()),
                );
                false
            }
        };

        let supervisor_up = match self.supervisor.system_status().await {
            Ok(status) => {
                checks.insert(
                    "container_system".to_string(),
                    CheckOutcome::with_detail(
                        "up",
                        format!(
                            "{}/{} containers running, server {}",
                            status.containers_running,
                            status.containers_total,
                            status.server_version
                        ),
                    ),
                );
                true
            }
            Err(e) => {
                checks.insert(
                    "container_system".to_string(),
                    CheckOutcome::with_detail("down", e.to_string()),
                );
                false
            }
        };

        let overall_up = inventory_up && supervisor_up;
        if !overall_up {
            tracing::warn!("infrastructure degraded; continuing with device checks");
        }

        store.set_infrastructure(InfrastructureReport {
            overall_up,
            checks,
            checked_at: Utc::now(),
        });
    }
}

/// Which per-device worker a run dispatches.
#[derive(Debug, Clone, Copy)]
enum WorkerMode {
    Validate,
    Monitor,
}

/// Process-exit verdict for a completed run: 0 iff the infrastructure is up
/// and every device passed. Suitable for schedulers and CI gates.
pub fn exit_verdict(snapshot: &StoreSnapshot) -> i32 {
    let infrastructure_up = snapshot
        .infrastructure
        .as_ref()
        .map(|i| i.overall_up)
        .unwrap_or(false);

    let all_passed = snapshot
        .devices
        .values()
        .all(|r| r.status == ValidationStatus::Passed);

    if infrastructure_up && all_passed { 0 } else { 1 }
}
