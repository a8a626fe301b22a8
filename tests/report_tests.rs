//! Summary rendering and report persistence.

mod common;

use std::sync::Arc;

use driftwatch::models::Device;
use driftwatch::{report, ReconciliationEngine, INFRASTRUCTURE_KEY};

use common::{ExecScript, FakeInventory, FakeSupervisor, HEALTHY_IP_ADDR, NO_LOOPBACK_IP_ADDR};

async fn run_mixed_fleet() -> driftwatch::StoreSnapshot {
    let devices = vec![
        Device::new("Router-1", "clab-R1"),
        Device::new("Router-2", "clab-R2"),
        Device::new("Router-3", "clab-R3"),
    ];
    let supervisor = FakeSupervisor::new()
        .with_exec("clab-R1", ExecScript::Stdout(HEALTHY_IP_ADDR))
        .with_exec("clab-R2", ExecScript::Exit(1, "exec failed"))
        .with_exec("clab-R3", ExecScript::Stdout(NO_LOOPBACK_IP_ADDR));

    let engine = ReconciliationEngine::new(
        common::test_config(4),
        Arc::new(FakeInventory::new(devices.clone())),
        Arc::new(supervisor),
    );
    engine.run(devices).await.snapshot()
}

#[tokio::test]
async fn test_summary_counts_and_sections() {
    let snapshot = run_mixed_fleet().await;
    let summary = report::summarize(&snapshot);

    assert!(summary.contains("Total devices: 3"));
    assert!(summary.contains("Passed:        1"));
    assert!(summary.contains("Failed:        1"));
    assert!(summary.contains("Unreachable:   1"));
    assert!(summary.contains("Infrastructure: UP"));

    // Each device is rendered exactly once in the details section.
    for name in ["Router-1", "Router-2", "Router-3"] {
        assert_eq!(summary.matches(name).count(), 1, "{name}");
    }
    assert!(summary.contains("error: exec failed"));
}

#[tokio::test]
async fn test_persisted_report_round_trips() {
    let snapshot = run_mixed_fleet().await;

    let dir = tempfile::tempdir().unwrap();
    let path = report::persist(&snapshot, dir.path()).unwrap();

    let file_name = path.file_name().unwrap().to_str().unwrap();
    assert!(file_name.starts_with("device_validation_"));
    assert!(file_name.ends_with(".json"));

    let raw = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();

    // Device entries sit at the top level next to the reserved key.
    for name in ["Router-1", "Router-2", "Router-3"] {
        assert!(json.get(name).is_some(), "{name} missing from report");
    }
    assert_eq!(json["Router-1"]["status"], "Passed");
    assert_eq!(json["Router-2"]["status"], "Unreachable");
    assert_eq!(json["Router-3"]["status"], "Failed");
    assert_eq!(json[INFRASTRUCTURE_KEY]["overall_up"], true);

    // Unreachable entries omit state they never collected.
    assert!(json["Router-2"].get("actual_state").is_none());
    assert!(json["Router-2"].get("error").is_some());
}

#[tokio::test]
async fn test_persist_to_missing_directory_fails() {
    let snapshot = run_mixed_fleet().await;
    let result = report::persist(&snapshot, std::path::Path::new("/nonexistent/driftwatch"));
    assert!(result.is_err());
}
