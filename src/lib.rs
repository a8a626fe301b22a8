//! driftwatch library
//!
//! Reconciles declared network device state from a source-of-truth inventory
//! against live state collected from the devices, over direct SSH with
//! automatic fallback to supervisor-mediated command execution.
//!
//! The core entry point is [`ReconciliationEngine`], constructed with an
//! [`inventory::InventoryClient`] and a [`supervisor::SupervisorClient`] so
//! both collaborators can be substituted with fakes in tests.

pub mod cli;
pub mod collector;
pub mod comparator;
pub mod config;
pub mod engine;
pub mod inventory;
pub mod models;
pub mod report;
pub mod supervisor;
pub mod transport;

// Re-export commonly used types for convenience
pub use comparator::Comparator;
pub use config::{Config, ConfigLoader};
pub use engine::{
    INFRASTRUCTURE_KEY, ReconciliationEngine, ResultStore, StoreSnapshot, exit_verdict,
};
pub use models::{
    ActualState, CheckOutcome, ConnectionMethod, ConnectionOutcome, Device, InfrastructureReport,
    IntendedState, InterfaceFact, InterfaceStatus, TransportDescriptor, ValidationResult,
    ValidationStatus,
};
pub use transport::TransportResolver;
