use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bifi", author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level (overrides `[logging]` in the run config)
    #[arg(long, global = true)]
    pub log_level: Option<tracing::Level>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute per-timestamp array performance from an irradiance scan
    Perf(PerfArgs),
    /// Compare a modeled column against a measured column
    Metrics(MetricsArgs),
}

#[derive(Args, Debug)]
pub struct PerfArgs {
    /// Run configuration (TOML with [array], [module], [front_only_module], [logging])
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: PathBuf,

    /// Delimited scan file with Wm2Front, Wm2Back, mattype, rearMat list cells
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub csv: Option<PathBuf>,

    /// JSON dump of in-memory scan results keyed by row index
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub results: Option<PathBuf>,

    /// Output file for the performance table
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub out: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// Override the bifaciality factor from the config
    #[arg(long)]
    pub bifaciality_factor: Option<f64>,
}

#[derive(Args, Debug)]
pub struct MetricsArgs {
    /// CSV file holding both series
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub input: PathBuf,

    /// Measured column name
    #[arg(long)]
    pub meas: String,

    /// Modeled column name
    #[arg(long)]
    pub model: String,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        build_cli_command().debug_assert();
    }

    #[test]
    fn perf_defaults_to_csv() {
        let cli = Cli::parse_from(["bifi", "perf", "--config", "run.toml", "--csv", "scan.csv", "-o", "out.csv"]);
        let Commands::Perf(args) = cli.command else {
            panic!("expected perf");
        };
        assert_eq!(args.format, OutputFormat::Csv);
        assert!(args.results.is_none());
        assert!(cli.log_level.is_none());
    }

    #[test]
    fn global_log_level_after_subcommand() {
        let cli = Cli::parse_from([
            "bifi", "metrics", "--input", "m.csv", "--meas", "a", "--model", "b", "--log-level", "debug",
        ]);
        assert_eq!(cli.log_level, Some(tracing::Level::DEBUG));
    }
}
