//! Command-line interface support

pub mod commands;
pub mod logging;

pub use commands::{ConfigSubcommand, handle_config_command};
pub use logging::init_logging;
