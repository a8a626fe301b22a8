//! driftwatch - device state reconciliation CLI
//!
//! Validates live network device state against the declared state held in a
//! source-of-truth inventory, or runs supervisor-level health checks, and
//! exits nonzero when anything is failed or unreachable.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use driftwatch::cli::{ConfigSubcommand, handle_config_command, init_logging};
use driftwatch::config::ConfigLoader;
use driftwatch::inventory::HttpInventoryClient;
use driftwatch::models::Device;
use driftwatch::supervisor::DockerCli;
use driftwatch::{Comparator, ReconciliationEngine, exit_verdict, report};

/// Device state reconciliation against a source-of-truth inventory
#[derive(Parser, Debug)]
#[command(name = "driftwatch")]
#[command(about = "Reconciles declared network device state against live device state", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd')]
    debug: bool,

    /// Path to a configuration file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Validate devices against their declared state
    Validate {
        /// Device names; discovered from the inventory by role when omitted
        devices: Vec<String>,

        /// Also gate on declared-vs-actual field equality
        #[arg(long)]
        field_checks: bool,

        /// Skip writing the JSON report
        #[arg(long)]
        no_save: bool,
    },
    /// Health-check devices through the container supervisor
    Monitor {
        /// Device names; discovered from the inventory by role when omitted
        devices: Vec<String>,

        /// Skip writing the JSON report
        #[arg(long)]
        no_save: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.debug);

    if let Command::Config { subcommand } = args.command {
        return handle_config_command(subcommand, args.config.as_deref());
    }

    let config = ConfigLoader::load(args.config.as_deref())
        .context("Failed to load configuration")?;

    let token = std::env::var(&config.auth_token_env).with_context(|| {
        format!(
            "Environment variable {} not set (inventory API token)",
            config.auth_token_env
        )
    })?;

    let inventory = Arc::new(
        HttpInventoryClient::new(&config.service_url, &token)
            .context("Failed to create inventory client")?,
    );
    let supervisor = Arc::new(DockerCli::new(config.exec_timeout()));

    let mut engine = ReconciliationEngine::new(config.clone(), inventory, supervisor);

    let (device_args, no_save, monitor_mode) = match &args.command {
        Command::Validate {
            devices,
            field_checks,
            no_save,
        } => {
            if *field_checks {
                engine = engine.with_comparator(Comparator::with_field_checks());
            }
            (devices.clone(), *no_save, false)
        }
        Command::Monitor { devices, no_save } => (devices.clone(), *no_save, true),
        Command::Config { .. } => unreachable!("handled above"),
    };

    let devices = resolve_devices(device_args, &engine).await?;
    tracing::debug!("reconciling {} devices", devices.len());

    let store = if monitor_mode {
        engine.monitor(devices).await
    } else {
        engine.run(devices).await
    };
    let snapshot = store.snapshot();

    print!("{}", report::summarize(&snapshot));

    if !no_save {
        match report::persist(&snapshot, config.report.dir.as_ref()) {
            Ok(path) => println!("Results saved to: {}", path.display()),
            Err(e) => {
                // Persistence trouble must not change the run verdict.
                tracing::warn!("failed to persist results: {e:#}");
            }
        }
    }

    std::process::exit(exit_verdict(&snapshot));
}

/// Use explicitly named devices, or fall back to inventory discovery.
///
/// Explicitly named devices use their own name as the backing container,
/// the same fallback the inventory applies when no container is declared.
async fn resolve_devices(names: Vec<String>, engine: &ReconciliationEngine) -> Result<Vec<Device>> {
    if names.is_empty() {
        let devices = engine
            .discover_devices()
            .await
            .context("Failed to discover devices from the inventory")?;
        if devices.is_empty() {
            anyhow::bail!("No devices found in the inventory");
        }
        return Ok(devices);
    }

    Ok(names
        .into_iter()
        .map(|name| Device::new(name.clone(), name))
        .collect())
}
