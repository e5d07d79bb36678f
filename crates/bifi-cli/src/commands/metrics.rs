use std::io::{self, Write};

use anyhow::{Context, Result};
use bifi_algo::ErrorMetrics;
use bifi_cli::cli::MetricsArgs;
use bifi_io::read_csv_columns;
use tabwriter::TabWriter;
use tracing::debug;

pub fn handle(args: &MetricsArgs) -> Result<()> {
    let columns = read_csv_columns(&args.input, &[args.meas.as_str(), args.model.as_str()])
        .with_context(|| format!("reading {}", args.input.display()))?;
    let (meas, model) = (&columns[0], &columns[1]);
    debug!(rows = meas.len(), "loaded measured/modeled series");

    let metrics = ErrorMetrics::compute(meas, model)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
        return Ok(());
    }

    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "METRIC\tVALUE")?;
    writeln!(writer, "MBD (%)\t{:.4}", metrics.mbd)?;
    writeln!(writer, "RMSE (%)\t{:.4}", metrics.rmse)?;
    writeln!(writer, "MBD\t{:.4}", metrics.mbd_abs)?;
    writeln!(writer, "RMSE\t{:.4}", metrics.rmse_abs)?;
    writeln!(writer, "samples\t{}", metrics.samples)?;
    writer.flush()?;
    Ok(())
}
