//! Shared result store
//!
//! The only mutable structure shared between device workers. Inserts are
//! single-key under a mutex; readers take a snapshot after the workers have
//! finished.

use crate::models::{InfrastructureReport, ValidationResult};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Reserved store key for the infrastructure-level record.
pub const INFRASTRUCTURE_KEY: &str = "infrastructure";

/// Thread-safe map from device name to validation result, plus one reserved
/// infrastructure entry.
#[derive(Clone, Default)]
pub struct ResultStore {
    inner: Arc<Mutex<StoreInner>>,
}

#[derive(Default)]
struct StoreInner {
    devices: BTreeMap<String, ValidationResult>,
    infrastructure: Option<InfrastructureReport>,
}

/// Immutable view of the store, taken after all writers completed. This is
/// also the exact shape of the persisted record: device entries at the top
/// level with the reserved infrastructure key alongside them.
#[derive(Debug, Clone, Serialize)]
pub struct StoreSnapshot {
    #[serde(flatten)]
    pub devices: BTreeMap<String, ValidationResult>,
    #[serde(rename = "infrastructure", skip_serializing_if = "Option::is_none")]
    pub infrastructure: Option<InfrastructureReport>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one device result under its device name.
    pub fn insert(&self, result: ValidationResult) {
        if result.device == INFRASTRUCTURE_KEY {
            tracing::warn!("ignoring device result named like the reserved key");
            return;
        }
        let mut inner = self.inner.lock().unwrap();
        inner.devices.insert(result.device.clone(), result);
    }

    /// Record the infrastructure report, replacing any earlier one.
    pub fn set_infrastructure(&self, report: InfrastructureReport) {
        let mut inner = self.inner.lock().unwrap();
        inner.infrastructure = Some(report);
    }

    /// Whether a device already has an entry.
    pub fn contains(&self, device: &str) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.devices.contains_key(device)
    }

    /// Total entry count, counting the infrastructure record when present.
    pub fn len(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.devices.len() + usize::from(inner.infrastructure.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy out the current contents.
    pub fn snapshot(&self) -> StoreSnapshot {
        let inner = self.inner.lock().unwrap();
        StoreSnapshot {
            devices: inner.devices.clone(),
            infrastructure: inner.infrastructure.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CheckOutcome, ConnectionMethod};
    use chrono::Utc;

    #[test]
    fn test_insert_and_snapshot() {
        let store = ResultStore::new();
        store.insert(ValidationResult::unreachable(
            "Router-1",
            ConnectionMethod::Ssh,
            "refused",
        ));

        assert!(store.contains("Router-1"));
        assert_eq!(store.len(), 1);

        let snapshot = store.snapshot();
        assert_eq!(snapshot.devices.len(), 1);
        assert!(snapshot.infrastructure.is_none());
    }

    #[test]
    fn test_infrastructure_counts_toward_len() {
        let store = ResultStore::new();
        store.set_infrastructure(InfrastructureReport {
            overall_up: true,
            checks: [("inventory_api".to_string(), CheckOutcome::new("up"))].into(),
            checked_at: Utc::now(),
        });
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_reserved_key_rejected_as_device_name() {
        let store = ResultStore::new();
        store.insert(ValidationResult::unreachable(
            INFRASTRUCTURE_KEY,
            ConnectionMethod::Ssh,
            "bogus",
        ));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_snapshot_serializes_devices_at_top_level() {
        let store = ResultStore::new();
        store.insert(ValidationResult::unreachable(
            "Router-2",
            ConnectionMethod::ContainerExec,
            "exit 1",
        ));
        store.set_infrastructure(InfrastructureReport {
            overall_up: false,
            checks: BTreeMap::new(),
            checked_at: Utc::now(),
        });

        let json = serde_json::to_value(store.snapshot()).unwrap();
        assert!(json.get("Router-2").is_some());
        assert_eq!(json["infrastructure"]["overall_up"], false);
    }
}
