//! Intended-vs-actual comparison and classification
//!
//! Turns a pair of (intended, actual) states into a `ValidationResult` with
//! a named check map. Unreachable devices short-circuit: no checks are
//! computed, the transport error is carried through.
//!
//! Declared-field comparison (ASN, loopback address value, router ID) is a
//! separate, independently testable extension that is off by default: the
//! shipped gating matches the long-standing behavior of recording intended
//! state for audit without gating on it.

use crate::models::{
    ActualState, CheckOutcome, IntendedState, InterfaceStatus, UNKNOWN, ValidationResult,
    ValidationStatus,
};
use chrono::Utc;
use std::collections::BTreeMap;

/// Name of the loopback interface checked on every device.
pub const LOOPBACK_INTERFACE: &str = "lo";

/// Compares collected state against declared state.
#[derive(Debug, Clone, Default)]
pub struct Comparator {
    field_checks: bool,
}

impl Comparator {
    /// Comparator with the default gating: loopback interface up, plus a
    /// connectivity liveness record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Comparator that additionally gates on declared-vs-actual field
    /// equality (ASN, loopback address, router ID). Fields unknown on either
    /// side are recorded as skipped rather than failed.
    pub fn with_field_checks() -> Self {
        Self { field_checks: true }
    }

    /// Classify one device. Pure with respect to its inputs apart from the
    /// result timestamp; identical inputs yield identical statuses and
    /// check maps.
    pub fn compare(
        &self,
        device: &str,
        intended: &IntendedState,
        actual: &ActualState,
    ) -> ValidationResult {
        if !actual.is_connected() {
            return ValidationResult::unreachable(
                device,
                actual.method,
                actual
                    .error
                    .clone()
                    .unwrap_or_else(|| "unknown error".to_string()),
            );
        }

        let mut checks = BTreeMap::new();
        let mut status = ValidationStatus::Passed;

        // Loopback interface must exist and be up.
        match actual.interface(LOOPBACK_INTERFACE) {
            Some(lo) if lo.status == InterfaceStatus::Up => {
                checks.insert(
                    "loopback_interface".to_string(),
                    CheckOutcome::with_detail("Up", lo.addresses.join(", ")),
                );
            }
            Some(_) => {
                checks.insert(
                    "loopback_interface".to_string(),
                    CheckOutcome::new("Down"),
                );
                status = ValidationStatus::Failed;
            }
            None => {
                checks.insert(
                    "loopback_interface".to_string(),
                    CheckOutcome::new("Not Found"),
                );
                status = ValidationStatus::Failed;
            }
        }

        // Liveness record, not a gating check: documents which transport
        // produced this result.
        checks.insert(
            "connectivity".to_string(),
            CheckOutcome::with_detail("Connected", actual.method.to_string()),
        );

        if self.field_checks {
            for (name, declared, observed) in [
                ("bgp_asn", &intended.bgp_asn, &actual.bgp_asn),
                ("loopback_address", &intended.loopback_ip, &actual.loopback_ip),
                ("router_id", &intended.ospf_router_id, &actual.bgp_router_id),
            ] {
                let outcome = compare_field(declared, observed);
                if outcome.status == "Mismatch" {
                    status = ValidationStatus::Failed;
                }
                checks.insert(name.to_string(), outcome);
            }
        }

        ValidationResult {
            device: device.to_string(),
            status,
            connection: actual.connection,
            method: actual.method,
            error: None,
            checks,
            intended_state: Some(intended.clone()),
            actual_state: Some(actual.clone()),
            validated_at: Utc::now(),
        }
    }
}

/// Equality check for one declared field. Either side being unknown makes
/// the check non-gating: there is nothing meaningful to compare.
fn compare_field(declared: &str, observed: &str) -> CheckOutcome {
    if declared == UNKNOWN || observed == UNKNOWN {
        CheckOutcome::new("Skipped")
    } else if declared == observed {
        CheckOutcome::with_detail("Match", declared)
    } else {
        CheckOutcome::with_detail("Mismatch", format!("declared {declared}, observed {observed}"))
    }
}
