//! Writers for [`PerformanceTable`].

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use bifi_core::{BifiResult, PerformanceTable};
use csv::Writer;
use tracing::debug;

use crate::scan_file::csv_error;

/// Write the table as CSV with the output header; `NaN` cells are written as `NaN`.
pub fn write_performance_csv(table: &PerformanceTable, path: &Path) -> BifiResult<()> {
    ensure_parent(path)?;
    let file = File::create(path)?;
    write_performance_csv_to(table, file)?;
    debug!(rows = table.len(), path = %path.display(), "wrote performance CSV");
    Ok(())
}

pub fn write_performance_csv_to<W: Write>(table: &PerformanceTable, writer: W) -> BifiResult<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(table.header()).map_err(csv_error)?;

    for row in table.iter() {
        let mut record: Vec<String> = Vec::with_capacity(12);
        if table.columns.timestamp {
            record.push(row.timestamp.clone().unwrap_or_default());
        }
        if table.columns.mod_number {
            record.push(row.mod_number.map(|v| v.to_string()).unwrap_or_default());
        }
        if table.columns.row_num {
            record.push(row.row_num.map(|v| v.to_string()).unwrap_or_default());
        }
        record.extend(row.values().iter().map(|v| v.to_string()));
        wtr.write_record(&record).map_err(csv_error)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write the rows as a JSON array. Non-finite values become `null`.
pub fn write_performance_json(table: &PerformanceTable, path: &Path) -> BifiResult<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(&table.rows)?;
    fs::write(path, json)?;
    debug!(rows = table.len(), path = %path.display(), "wrote performance JSON");
    Ok(())
}

fn ensure_parent(path: &Path) -> BifiResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Convert to a polars DataFrame with the output column names.
#[cfg(feature = "polars")]
pub fn performance_dataframe(table: &PerformanceTable) -> BifiResult<polars::prelude::DataFrame> {
    use bifi_core::{BifiError, VALUE_COLUMNS};
    use polars::prelude::*;

    let mut columns = Vec::with_capacity(12);
    if table.columns.timestamp {
        let values: Vec<Option<String>> = table.iter().map(|r| r.timestamp.clone()).collect();
        columns.push(Series::new("timestamp", values));
    }
    if table.columns.mod_number {
        let values: Vec<Option<i64>> = table.iter().map(|r| r.mod_number).collect();
        columns.push(Series::new("ModNumber", values));
    }
    if table.columns.row_num {
        let values: Vec<Option<i64>> = table.iter().map(|r| r.row_num).collect();
        columns.push(Series::new("rowNum", values));
    }
    for (idx, name) in VALUE_COLUMNS.iter().enumerate() {
        let values: Vec<f64> = table.iter().map(|r| r.values()[idx]).collect();
        columns.push(Series::new(name, values));
    }

    DataFrame::new(columns).map_err(|e| BifiError::Parse(format!("building DataFrame: {e}")))
}
