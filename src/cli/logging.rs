//! Logging initialization

/// Initialize logging based on the debug flag
///
/// Logs go to stderr so the summary on stdout stays machine-consumable.
/// `RUST_LOG` overrides the level either way.
pub fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();
}
