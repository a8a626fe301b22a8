//! Source-of-truth inventory access
//!
//! The engine only reads from the inventory: device discovery by role,
//! per-device declared state, and a liveness/status probe. Implementations
//! hide the HTTP details behind [`InventoryClient`] so tests can substitute
//! fakes.

mod client;

pub use client::HttpInventoryClient;

use crate::models::{Device, IntendedState};
use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by inventory access.
///
/// A device the inventory simply does not declare is *not* an error; it is
/// `Ok(None)` from [`InventoryClient::device_by_name`].
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("inventory request failed: {0}")]
    Request(String),

    /// The service answered, but not with something usable.
    #[error("inventory returned unexpected payload: {0}")]
    Payload(String),
}

/// Liveness snapshot of the inventory service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiStatus {
    pub version: String,
    pub device_count: u64,
    pub latency_ms: u64,
}

/// Read-only capability set the engine needs from the source of truth.
#[async_trait]
pub trait InventoryClient: Send + Sync {
    /// Devices declared under the given role.
    async fn devices_by_role(&self, role: &str) -> Result<Vec<Device>, InventoryError>;

    /// Declared state for one device. `Ok(None)` means the device is not
    /// declared at all, a distinct and non-retryable condition.
    async fn device_by_name(&self, name: &str) -> Result<Option<IntendedState>, InventoryError>;

    /// Service liveness plus a cheap device-count query.
    async fn status(&self) -> Result<ApiStatus, InventoryError>;
}
