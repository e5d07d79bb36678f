use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use bifi_algo::ArrayAggregator;
use bifi_cli::cli::{OutputFormat, PerfArgs};
use bifi_cli::config::PerfConfig;
use bifi_core::{nan_mean, BifiError, PerformanceTable, ScanResults, VALUE_COLUMNS};
use bifi_io::{read_scan_results_json, write_performance_csv, write_performance_json, ArraySource};
use tabwriter::TabWriter;
use tracing::info;

pub fn handle(args: &PerfArgs, config: &PerfConfig) -> Result<()> {
    let start = Instant::now();
    let module = config.module()?;
    let front_only = config.front_only_module()?;

    let mut settings = config.array.clone();
    if let Some(phi) = args.bifaciality_factor {
        settings.bifaciality_factor = phi;
    }

    let results: Option<ScanResults> = args
        .results
        .as_deref()
        .map(read_scan_results_json)
        .transpose()
        .context("reading scan results")?;
    let source = ArraySource {
        file: args.csv.as_deref(),
        results: results.as_ref(),
    };
    if matches!((source.file, source.results), (None, None)) {
        return Err(BifiError::NoInputProvided).context("pass --csv or --results");
    }

    let table = ArrayAggregator::new(&settings).run(&source, &module, front_only.as_ref())?;

    write_table(&table, &args.out, args.format)?;
    info!(
        rows = table.len(),
        out = %args.out.display(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "performance table written"
    );

    print_summary(&table)
}

fn write_table(table: &PerformanceTable, out: &Path, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Csv => write_performance_csv(table, out),
        OutputFormat::Json => write_performance_json(table, out),
    }
    .with_context(|| format!("writing {}", out.display()))
}

fn print_summary(table: &PerformanceTable) -> Result<()> {
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "COLUMN\tMEAN")?;
    for name in VALUE_COLUMNS {
        let mean = table.series(name).map(nan_mean).unwrap_or(f64::NAN);
        writeln!(writer, "{name}\t{mean:.3}")?;
    }
    writeln!(writer, "rows\t{}", table.len())?;
    writer.flush()?;
    Ok(())
}
