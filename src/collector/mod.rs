//! Actual-state collection
//!
//! Retrieves the diagnostic command output from a device over its resolved
//! transport and parses it into structured facts. Direct-transport failures
//! fall back to the supervisor's exec channel before anything is reported as
//! unreachable.

pub mod parser;
pub mod ssh;

pub use parser::parse_interface_table;

use crate::models::{ActualState, ConnectionMethod, Device, TransportDescriptor};
use crate::supervisor::SupervisorClient;
use std::sync::Arc;

/// Diagnostic command enumerating interfaces and addresses.
pub const STATE_COMMAND: &str = "ip addr show";

/// Collects observed device state over a resolved transport.
pub struct Collector {
    supervisor: Arc<dyn SupervisorClient>,
}

impl Collector {
    pub fn new(supervisor: Arc<dyn SupervisorClient>) -> Self {
        Self { supervisor }
    }

    /// Collect the device's actual state.
    ///
    /// Never returns an error: transport failures become an `ActualState`
    /// with a `Failed` connection outcome. A device without a recognizable
    /// interface table still counts as connected; flagging missing facts is
    /// the comparator's job.
    pub async fn collect(&self, device: &Device, transport: &TransportDescriptor) -> ActualState {
        match transport {
            TransportDescriptor::Direct {
                host,
                port,
                username,
                password,
                connect_timeout,
                session_timeout,
            } => {
                tracing::debug!("collecting from {} via ssh ({host})", device.name);
                match ssh::run_command(
                    host,
                    *port,
                    username,
                    password,
                    STATE_COMMAND,
                    *connect_timeout,
                    *session_timeout,
                )
                .await
                {
                    Ok(output) => {
                        let interfaces = parse_interface_table(&output);
                        ActualState::connected(&device.name, ConnectionMethod::Ssh, interfaces)
                    }
                    Err(e) => {
                        // Direct transport is a policy, not a guarantee.
                        tracing::debug!(
                            "ssh to {} failed ({e}), falling back to exec",
                            device.name
                        );
                        self.collect_via_exec(device).await
                    }
                }
            }
            TransportDescriptor::Indirect { container } => {
                tracing::debug!("collecting from {} via exec ({container})", device.name);
                self.collect_via_exec(device).await
            }
        }
    }

    async fn collect_via_exec(&self, device: &Device) -> ActualState {
        match self.supervisor.exec(&device.container, STATE_COMMAND).await {
            Ok(output) if output.success() => {
                let interfaces = parse_interface_table(&output.stdout);
                ActualState::connected(&device.name, ConnectionMethod::ContainerExec, interfaces)
            }
            Ok(output) => {
                let error = if output.stderr.trim().is_empty() {
                    format!("command exited with status {}", output.exit_code)
                } else {
                    output.stderr.trim().to_string()
                };
                ActualState::failed(&device.name, ConnectionMethod::ContainerExec, error)
            }
            Err(e) => {
                ActualState::failed(&device.name, ConnectionMethod::ContainerExec, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConnectionOutcome;
    use crate::supervisor::{ContainerStatus, ExecOutput, SupervisorError, SystemStatus};
    use async_trait::async_trait;
    use std::time::Duration;

    struct ScriptedSupervisor {
        exec_result: Result<ExecOutput, String>,
    }

    #[async_trait]
    impl SupervisorClient for ScriptedSupervisor {
        async fn inspect_address(&self, _: &str) -> Result<Option<String>, SupervisorError> {
            Ok(None)
        }

        async fn exec(&self, _: &str, _: &str) -> Result<ExecOutput, SupervisorError> {
            match &self.exec_result {
                Ok(output) => Ok(output.clone()),
                Err(e) => Err(SupervisorError::Command(e.clone())),
            }
        }

        async fn container_status(&self, _: &str) -> Result<ContainerStatus, SupervisorError> {
            Ok(ContainerStatus::Running)
        }

        async fn system_status(&self) -> Result<SystemStatus, SupervisorError> {
            unimplemented!("not used by collector tests")
        }
    }

    fn exec_success(stdout: &str) -> ScriptedSupervisor {
        ScriptedSupervisor {
            exec_result: Ok(ExecOutput {
                stdout: stdout.to_string(),
                stderr: String::new(),
                exit_code: 0,
            }),
        }
    }

    const LO_UP: &str = "\
1: lo: <LOOPBACK,UP,LOWER_UP> mtu 65536
    inet 1.1.1.1/32 scope host lo
";

    #[tokio::test]
    async fn test_indirect_collection_parses_interfaces() {
        let collector = Collector::new(Arc::new(exec_success(LO_UP)));
        let device = Device::new("Router-1", "R1");
        let transport = TransportDescriptor::Indirect {
            container: "R1".to_string(),
        };

        let actual = collector.collect(&device, &transport).await;
        assert_eq!(actual.connection, ConnectionOutcome::Connected);
        assert_eq!(actual.method, ConnectionMethod::ContainerExec);
        assert_eq!(actual.loopback_ip, "1.1.1.1/32");
    }

    #[tokio::test]
    async fn test_exec_nonzero_exit_is_failed_state() {
        let collector = Collector::new(Arc::new(ScriptedSupervisor {
            exec_result: Ok(ExecOutput {
                stdout: String::new(),
                stderr: "OCI runtime exec failed".to_string(),
                exit_code: 1,
            }),
        }));
        let device = Device::new("Router-2", "R2");
        let transport = TransportDescriptor::Indirect {
            container: "R2".to_string(),
        };

        let actual = collector.collect(&device, &transport).await;
        assert_eq!(actual.connection, ConnectionOutcome::Failed);
        assert_eq!(actual.error.as_deref(), Some("OCI runtime exec failed"));
        assert!(actual.interfaces.is_empty());
    }

    #[tokio::test]
    async fn test_direct_failure_falls_back_to_exec() {
        // Port 1 on localhost refuses immediately; the collector must then
        // produce the same shape a plain indirect success would.
        let collector = Collector::new(Arc::new(exec_success(LO_UP)));
        let device = Device::new("Router-1", "R1");
        let transport = TransportDescriptor::Direct {
            host: "127.0.0.1".to_string(),
            port: 1,
            username: "root".to_string(),
            password: "password".to_string(),
            connect_timeout: Duration::from_secs(1),
            session_timeout: Duration::from_secs(2),
        };

        let via_fallback = collector.collect(&device, &transport).await;
        let via_indirect = collector
            .collect(
                &device,
                &TransportDescriptor::Indirect {
                    container: "R1".to_string(),
                },
            )
            .await;

        assert_eq!(via_fallback.connection, ConnectionOutcome::Connected);
        assert_eq!(via_fallback.method, ConnectionMethod::ContainerExec);
        assert_eq!(via_fallback.interfaces, via_indirect.interfaces);
        assert_eq!(via_fallback.loopback_ip, via_indirect.loopback_ip);
    }

    #[tokio::test]
    async fn test_direct_failure_with_failing_exec_is_unreachable_shape() {
        let collector = Collector::new(Arc::new(ScriptedSupervisor {
            exec_result: Err("container not running".to_string()),
        }));
        let device = Device::new("Router-2", "R2");
        let transport = TransportDescriptor::Direct {
            host: "127.0.0.1".to_string(),
            port: 1,
            username: "root".to_string(),
            password: "password".to_string(),
            connect_timeout: Duration::from_secs(1),
            session_timeout: Duration::from_secs(2),
        };

        let actual = collector.collect(&device, &transport).await;
        assert_eq!(actual.connection, ConnectionOutcome::Failed);
        assert!(actual.error.as_deref().unwrap().contains("not running"));
    }

    #[tokio::test]
    async fn test_missing_loopback_still_connected() {
        let no_lo = "2: eth0: <UP> mtu 1500\n    inet 172.20.0.2/24 scope global eth0\n";
        let collector = Collector::new(Arc::new(exec_success(no_lo)));
        let device = Device::new("Router-3", "R3");
        let transport = TransportDescriptor::Indirect {
            container: "R3".to_string(),
        };

        let actual = collector.collect(&device, &transport).await;
        assert_eq!(actual.connection, ConnectionOutcome::Connected);
        assert!(actual.interface("lo").is_none());
    }
}
