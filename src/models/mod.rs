//! Core data model for device state reconciliation
//!
//! Every record that crosses a worker boundary or lands in the persisted
//! report lives here. Failure is part of the model: connection outcomes and
//! validation statuses are data, not errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Sentinel for declared fields the inventory does not carry.
pub const UNKNOWN: &str = "Unknown";

/// A device as discovered from the inventory service.
///
/// Immutable for the duration of a run. `container` names the backing
/// execution unit used for address inspection and indirect command execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub name: String,
    pub container: String,
}

impl Device {
    pub fn new(name: impl Into<String>, container: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            container: container.into(),
        }
    }
}

/// Access path chosen for a device at the start of a run.
///
/// Resolution is a policy, not a guarantee: a `Direct` descriptor may still
/// fail at connect time, in which case collection falls back to the indirect
/// path. Descriptors are never cached across runs because container
/// addresses change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportDescriptor {
    /// Network session straight to the device.
    Direct {
        host: String,
        port: u16,
        username: String,
        password: String,
        connect_timeout: Duration,
        session_timeout: Duration,
    },
    /// Command execution mediated through the backing supervisor.
    Indirect { container: String },
}

/// Administrative/operational interface status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InterfaceStatus {
    Up,
    Down,
}

/// One observed interface, parsed from diagnostic command output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceFact {
    pub name: String,
    pub status: InterfaceStatus,
    /// Assigned addresses in the order they appeared. May be empty.
    pub addresses: Vec<String>,
}

/// Declared configuration for a device, fetched fresh each run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntendedState {
    pub device_name: String,
    pub bgp_asn: String,
    pub loopback_ip: String,
    pub ospf_router_id: String,
    pub ospf_area: String,
    pub primary_ip: String,
}

impl IntendedState {
    /// Intended state for a device the inventory does not declare.
    ///
    /// Used so undeclared-but-reachable devices still appear in the report
    /// instead of being dropped.
    pub fn unknown(device_name: &str) -> Self {
        Self {
            device_name: device_name.to_string(),
            bgp_asn: UNKNOWN.to_string(),
            loopback_ip: UNKNOWN.to_string(),
            ospf_router_id: UNKNOWN.to_string(),
            ospf_area: "0".to_string(),
            primary_ip: UNKNOWN.to_string(),
        }
    }
}

/// Whether state collection reached the device at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionOutcome {
    Connected,
    Failed,
}

/// Transport that actually produced (or failed to produce) the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionMethod {
    Ssh,
    ContainerExec,
}

impl std::fmt::Display for ConnectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ssh => write!(f, "ssh"),
            Self::ContainerExec => write!(f, "container_exec"),
        }
    }
}

/// Observed state of a device at collection time.
///
/// On `Failed` only `connection`, `method`, `error` and `collected_at` are
/// meaningful; the interface table is empty by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActualState {
    pub device_name: String,
    pub connection: ConnectionOutcome,
    pub method: ConnectionMethod,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<InterfaceFact>,
    pub bgp_asn: String,
    pub bgp_router_id: String,
    pub loopback_ip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub collected_at: DateTime<Utc>,
}

impl ActualState {
    /// State for a successful collection. The loopback address is lifted out
    /// of the interface table for convenience; BGP facts are not collected
    /// by the diagnostic command and stay `Unknown`.
    pub fn connected(
        device_name: &str,
        method: ConnectionMethod,
        interfaces: Vec<InterfaceFact>,
    ) -> Self {
        let loopback_ip = interfaces
            .iter()
            .find(|i| i.name == "lo")
            .and_then(|i| i.addresses.first().cloned())
            .unwrap_or_else(|| UNKNOWN.to_string());

        Self {
            device_name: device_name.to_string(),
            connection: ConnectionOutcome::Connected,
            method,
            interfaces,
            bgp_asn: UNKNOWN.to_string(),
            bgp_router_id: UNKNOWN.to_string(),
            loopback_ip,
            error: None,
            collected_at: Utc::now(),
        }
    }

    /// State for a collection that could not reach the device.
    pub fn failed(device_name: &str, method: ConnectionMethod, error: impl Into<String>) -> Self {
        Self {
            device_name: device_name.to_string(),
            connection: ConnectionOutcome::Failed,
            method,
            interfaces: Vec::new(),
            bgp_asn: UNKNOWN.to_string(),
            bgp_router_id: UNKNOWN.to_string(),
            loopback_ip: UNKNOWN.to_string(),
            error: Some(error.into()),
            collected_at: Utc::now(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection == ConnectionOutcome::Connected
    }

    /// Look up an interface by name.
    pub fn interface(&self, name: &str) -> Option<&InterfaceFact> {
        self.interfaces.iter().find(|i| i.name == name)
    }
}

/// Aggregate classification of a device's reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationStatus {
    /// Connected and every gating check passed.
    Passed,
    /// Connected but at least one gating check failed.
    Failed,
    /// State collection never reached the device.
    Unreachable,
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Passed => write!(f, "Passed"),
            Self::Failed => write!(f, "Failed"),
            Self::Unreachable => write!(f, "Unreachable"),
        }
    }
}

/// Outcome of a single named check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl CheckOutcome {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            detail: None,
        }
    }

    pub fn with_detail(status: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            detail: Some(detail.into()),
        }
    }
}

/// Per-device reconciliation record, one per device per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub device: String,
    pub status: ValidationStatus,
    pub connection: ConnectionOutcome,
    pub method: ConnectionMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub checks: BTreeMap<String, CheckOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intended_state: Option<IntendedState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_state: Option<ActualState>,
    pub validated_at: DateTime<Utc>,
}

impl ValidationResult {
    /// Record for a device that could not be reached at all. No checks are
    /// computed; comparing state that was never collected would only mask
    /// the unreachable condition.
    pub fn unreachable(device: &str, method: ConnectionMethod, error: impl Into<String>) -> Self {
        Self {
            device: device.to_string(),
            status: ValidationStatus::Unreachable,
            connection: ConnectionOutcome::Failed,
            method,
            error: Some(error.into()),
            checks: BTreeMap::new(),
            intended_state: None,
            actual_state: None,
            validated_at: Utc::now(),
        }
    }
}

/// Infrastructure-level connectivity record, stored once per run under the
/// reserved store key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfrastructureReport {
    /// Up iff every infrastructure check is up.
    pub overall_up: bool,
    pub checks: BTreeMap<String, CheckOutcome>,
    pub checked_at: DateTime<Utc>,
}
