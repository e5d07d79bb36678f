pub mod cli;
pub mod config;

pub use cli::{build_cli_command, Cli, Commands, MetricsArgs, OutputFormat, PerfArgs};
pub use config::{LoggingConfig, ModuleConfig, PerfConfig};
