use anyhow::{Context, Result};
use bifi_cli::cli::{Cli, Commands};
use bifi_cli::config::PerfConfig;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;

fn init_logging(level: Level) -> Result<()> {
    // stdout carries command output
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")
}

fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Perf(args) => {
            let config = PerfConfig::load(&args.config)?;
            let level = match cli.log_level {
                Some(level) => level,
                None => config.logging.level()?,
            };
            init_logging(level)?;
            commands::perf::handle(args, &config)
        }
        Commands::Metrics(args) => {
            init_logging(cli.log_level.unwrap_or(Level::INFO))?;
            commands::metrics::handle(args)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
