//! Result rendering and persistence
//!
//! Renders a completed store snapshot into a human-readable summary and
//! writes the full structured record to a timestamped JSON file. Every
//! device appears exactly once, including fully-failed ones.

use crate::engine::StoreSnapshot;
use crate::models::ValidationStatus;
use anyhow::{Context, Result};
use chrono::Utc;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Render the aggregate summary.
pub fn summarize(snapshot: &StoreSnapshot) -> String {
    let total = snapshot.devices.len();
    let passed = count_status(snapshot, ValidationStatus::Passed);
    let failed = count_status(snapshot, ValidationStatus::Failed);
    let unreachable = count_status(snapshot, ValidationStatus::Unreachable);

    let mut out = String::new();
    let _ = writeln!(out, "Device State Reconciliation Summary");
    let _ = writeln!(out, "===================================");
    let _ = writeln!(out, "Total devices: {total}");
    let _ = writeln!(out, "Passed:        {passed}");
    let _ = writeln!(out, "Failed:        {failed}");
    let _ = writeln!(out, "Unreachable:   {unreachable}");
    let _ = writeln!(out);

    if let Some(infra) = &snapshot.infrastructure {
        let verdict = if infra.overall_up { "UP" } else { "DOWN" };
        let _ = writeln!(out, "Infrastructure: {verdict}");
        for (name, check) in &infra.checks {
            match &check.detail {
                Some(detail) => {
                    let _ = writeln!(out, "  {name}: {} ({detail})", check.status);
                }
                None => {
                    let _ = writeln!(out, "  {name}: {}", check.status);
                }
            }
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "Device details:");
    for (name, result) in &snapshot.devices {
        let _ = writeln!(out, "{name}: {} ({})", result.status, result.method);
        if let Some(error) = &result.error {
            let _ = writeln!(out, "  error: {error}");
        }
        for (check_name, check) in &result.checks {
            let _ = writeln!(out, "  {check_name}: {}", check.status);
        }
    }

    out
}

/// Persist the full snapshot to `device_validation_<timestamp>.json` in the
/// given directory, returning the written path.
pub fn persist(snapshot: &StoreSnapshot, dir: &Path) -> Result<PathBuf> {
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("device_validation_{timestamp}.json"));

    let json =
        serde_json::to_string_pretty(snapshot).context("Failed to serialize result store")?;
    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;

    Ok(path)
}

fn count_status(snapshot: &StoreSnapshot, status: ValidationStatus) -> usize {
    snapshot
        .devices
        .values()
        .filter(|r| r.status == status)
        .count()
}
