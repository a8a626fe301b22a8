//! HTTP inventory client
//!
//! Talks to a NetBox-style REST API with token authentication. All requests
//! carry a bounded timeout; responses are mapped into the core data model
//! with `"Unknown"` defaults for declared fields the inventory omits.

use super::{ApiStatus, InventoryClient, InventoryError};
use crate::models::{Device, IntendedState, UNKNOWN};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Inventory client backed by `reqwest`.
pub struct HttpInventoryClient {
    client: reqwest::Client,
    base_url: Url,
    token: String,
}

/// One page of a device list response.
#[derive(Debug, Deserialize)]
struct DeviceListPage {
    #[serde(default)]
    count: u64,
    #[serde(default)]
    results: Vec<DeviceRecord>,
}

/// The subset of a device record the engine consumes.
#[derive(Debug, Deserialize)]
struct DeviceRecord {
    name: String,
    #[serde(default)]
    custom_fields: serde_json::Map<String, Value>,
    #[serde(default)]
    primary_ip4: Option<PrimaryIp>,
}

#[derive(Debug, Deserialize)]
struct PrimaryIp {
    #[serde(default)]
    address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(rename = "netbox-version", default)]
    version: Option<String>,
}

impl HttpInventoryClient {
    /// Create a client for the given service URL and API token.
    pub fn new(service_url: &str, token: &str) -> Result<Self, InventoryError> {
        let base_url = Url::parse(service_url)
            .map_err(|e| InventoryError::Request(format!("invalid service URL: {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| InventoryError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            token: token.to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, InventoryError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| InventoryError::Request(format!("invalid request path {path}: {e}")))?;

        let resp = self
            .client
            .get(url)
            .query(query)
            .header("Authorization", format!("Token {}", self.token))
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| InventoryError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(InventoryError::Request(format!(
                "inventory responded with status {}",
                resp.status()
            )));
        }

        resp.json::<T>()
            .await
            .map_err(|e| InventoryError::Payload(e.to_string()))
    }
}

#[async_trait]
impl InventoryClient for HttpInventoryClient {
    async fn devices_by_role(&self, role: &str) -> Result<Vec<Device>, InventoryError> {
        let page: DeviceListPage = self
            .get_json("/api/dcim/devices/", &[("role", role)])
            .await?;

        tracing::debug!("inventory returned {} devices for role {role}", page.count);

        Ok(page.results.iter().map(device_from_record).collect())
    }

    async fn device_by_name(&self, name: &str) -> Result<Option<IntendedState>, InventoryError> {
        let page: DeviceListPage = self
            .get_json("/api/dcim/devices/", &[("name", name)])
            .await?;

        // Zero matching records means the device is simply not declared.
        Ok(page.results.first().map(intended_from_record))
    }

    async fn status(&self) -> Result<ApiStatus, InventoryError> {
        let started = Instant::now();

        let status: StatusResponse = self.get_json("/api/status/", &[]).await?;
        let page: DeviceListPage = self
            .get_json("/api/dcim/devices/", &[("limit", "1")])
            .await?;

        Ok(ApiStatus {
            version: status.version.unwrap_or_else(|| UNKNOWN.to_string()),
            device_count: page.count,
            latency_ms: started.elapsed().as_millis() as u64,
        })
    }
}

/// Declared custom field as a string, tolerating numeric declarations.
fn custom_field(record: &DeviceRecord, key: &str) -> Option<String> {
    match record.custom_fields.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn device_from_record(record: &DeviceRecord) -> Device {
    // The backing container defaults to the device name when the inventory
    // does not declare one explicitly.
    let container = custom_field(record, "container").unwrap_or_else(|| record.name.clone());
    Device::new(record.name.clone(), container)
}

fn intended_from_record(record: &DeviceRecord) -> IntendedState {
    IntendedState {
        device_name: record.name.clone(),
        bgp_asn: custom_field(record, "bgp_asn").unwrap_or_else(|| UNKNOWN.to_string()),
        loopback_ip: custom_field(record, "loopback_ip").unwrap_or_else(|| UNKNOWN.to_string()),
        ospf_router_id: custom_field(record, "ospf_router_id")
            .unwrap_or_else(|| UNKNOWN.to_string()),
        ospf_area: custom_field(record, "ospf_area").unwrap_or_else(|| "0".to_string()),
        primary_ip: record
            .primary_ip4
            .as_ref()
            .and_then(|ip| ip.address.clone())
            .unwrap_or_else(|| UNKNOWN.to_string()),
    }
}
