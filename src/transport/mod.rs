//! Per-device transport resolution
//!
//! Decides, at the start of a run, whether a device is reachable over a
//! direct network session or has to be driven through the supervisor's
//! command-execution channel. Resolution failures are never raised; they
//! downgrade to the indirect path.

use crate::config::Config;
use crate::models::{Device, TransportDescriptor};
use crate::supervisor::SupervisorClient;
use std::time::Duration;

/// Resolves an access path for each device.
///
/// Carries the credential and timeout policy so descriptors are
/// self-contained; the resolver itself holds no per-run state and nothing is
/// cached between runs.
#[derive(Debug, Clone)]
pub struct TransportResolver {
    username: String,
    password: Option<String>,
    ssh_port: u16,
    connect_timeout: Duration,
    session_timeout: Duration,
}

impl TransportResolver {
    /// Build a resolver from configuration, reading the device password from
    /// the configured environment variable. A missing password simply forces
    /// the indirect path for every device.
    pub fn from_config(config: &Config) -> Self {
        let password = std::env::var(&config.device.password_env).ok();
        if password.is_none() {
            tracing::debug!(
                "{} not set; direct transport disabled",
                config.device.password_env
            );
        }

        Self {
            username: config.device.username.clone(),
            password,
            ssh_port: config.device.ssh_port,
            connect_timeout: config.connect_timeout(),
            session_timeout: config.session_timeout(),
        }
    }

    /// Resolver with explicit credentials, bypassing the environment.
    pub fn with_credentials(
        username: impl Into<String>,
        password: impl Into<String>,
        ssh_port: u16,
        connect_timeout: Duration,
        session_timeout: Duration,
    ) -> Self {
        Self {
            username: username.into(),
            password: Some(password.into()),
            ssh_port,
            connect_timeout,
            session_timeout,
        }
    }

    /// Pick an access path for one device.
    ///
    /// Asks the supervisor for the container's current address; an address
    /// plus available credentials yields a direct descriptor. Inspection
    /// failure, a missing address, or missing credentials downgrade silently
    /// to the indirect path.
    pub async fn resolve(
        &self,
        device: &Device,
        supervisor: &dyn SupervisorClient,
    ) -> TransportDescriptor {
        let address = match supervisor.inspect_address(&device.container).await {
            Ok(addr) => addr,
            Err(e) => {
                tracing::debug!("address inspection failed for {}: {e}", device.container);
                None
            }
        };

        match (address, &self.password) {
            (Some(host), Some(password)) => {
                tracing::debug!("{} -> {} ({host})", device.name, device.container);
                TransportDescriptor::Direct {
                    host,
                    port: self.ssh_port,
                    username: self.username.clone(),
                    password: password.clone(),
                    connect_timeout: self.connect_timeout,
                    session_timeout: self.session_timeout,
                }
            }
            _ => {
                tracing::debug!("{} -> {} (exec)", device.name, device.container);
                TransportDescriptor::Indirect {
                    container: device.container.clone(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supervisor::{ContainerStatus, ExecOutput, SupervisorError, SystemStatus};
    use async_trait::async_trait;

    struct StubSupervisor {
        address: Result<Option<String>, ()>,
    }

    #[async_trait]
    impl SupervisorClient for StubSupervisor {
        async fn inspect_address(&self, _: &str) -> Result<Option<String>, SupervisorError> {
            match &self.address {
                Ok(addr) => Ok(addr.clone()),
                Err(()) => Err(SupervisorError::Command("no such container".to_string())),
            }
        }

        async fn exec(&self, _: &str, _: &str) -> Result<ExecOutput, SupervisorError> {
            unimplemented!("not used by resolver tests")
        }

        async fn container_status(&self, _: &str) -> Result<ContainerStatus, SupervisorError> {
            unimplemented!("not used by resolver tests")
        }

        async fn system_status(&self) -> Result<SystemStatus, SupervisorError> {
            unimplemented!("not used by resolver tests")
        }
    }

    fn resolver() -> TransportResolver {
        TransportResolver::with_credentials(
            "root",
            "secret",
            22,
            Duration::from_secs(20),
            Duration::from_secs(60),
        )
    }

    #[tokio::test]
    async fn test_address_yields_direct_transport() {
        let supervisor = StubSupervisor {
            address: Ok(Some("172.20.0.2".to_string())),
        };
        let device = Device::new("Router-1", "R1");

        let transport = resolver().resolve(&device, &supervisor).await;
        match transport {
            TransportDescriptor::Direct { host, port, .. } => {
                assert_eq!(host, "172.20.0.2");
                assert_eq!(port, 22);
            }
            other => panic!("expected direct transport, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_address_downgrades_to_indirect() {
        let supervisor = StubSupervisor { address: Ok(None) };
        let device = Device::new("Router-2", "R2");

        let transport = resolver().resolve(&device, &supervisor).await;
        assert_eq!(
            transport,
            TransportDescriptor::Indirect {
                container: "R2".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_inspection_failure_downgrades_to_indirect() {
        let supervisor = StubSupervisor { address: Err(()) };
        let device = Device::new("Router-3", "R3");

        let transport = resolver().resolve(&device, &supervisor).await;
        assert!(matches!(transport, TransportDescriptor::Indirect { .. }));
    }

    #[tokio::test]
    async fn test_missing_password_forces_indirect() {
        let supervisor = StubSupervisor {
            address: Ok(Some("172.20.0.2".to_string())),
        };
        let device = Device::new("Router-1", "R1");

        let resolver = TransportResolver {
            username: "root".to_string(),
            password: None,
            ssh_port: 22,
            connect_timeout: Duration::from_secs(20),
            session_timeout: Duration::from_secs(60),
        };

        let transport = resolver.resolve(&device, &supervisor).await;
        assert!(matches!(transport, TransportDescriptor::Indirect { .. }));
    }
}
