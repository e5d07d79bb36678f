//! Plain numeric columns, e.g. measured vs modeled irradiance for error metrics.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use bifi_core::{BifiError, BifiResult};
use csv::{ReaderBuilder, Trim};

use crate::scan_file::csv_error;

/// Read the named columns from a CSV file. Blank and `nan` cells become `NaN`.
pub fn read_csv_columns(path: &Path, names: &[&str]) -> BifiResult<Vec<Vec<f64>>> {
    let file = File::open(path)?;
    read_csv_columns_from(file, names)
}

pub fn read_csv_columns_from<R: Read>(reader: R, names: &[&str]) -> BifiResult<Vec<Vec<f64>>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);
    let headers = rdr.headers().map_err(csv_error)?.clone();
    let indices = names
        .iter()
        .map(|name| {
            headers
                .iter()
                .position(|h| h == *name)
                .ok_or_else(|| BifiError::Parse(format!("missing column '{name}'")))
        })
        .collect::<BifiResult<Vec<_>>>()?;

    let mut columns = vec![Vec::new(); names.len()];
    for (row, record) in rdr.records().enumerate() {
        let record = record.map_err(csv_error)?;
        for (column, &idx) in columns.iter_mut().zip(&indices) {
            let cell = record.get(idx).unwrap_or("");
            let value = if cell.is_empty() {
                f64::NAN
            } else {
                cell.parse::<f64>().map_err(|_| {
                    BifiError::Parse(format!("row {}: '{cell}' is not a number", row + 1))
                })?
            };
            column.push(value);
        }
    }
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_selected_columns_in_order() {
        let data = "ts,meas,model\n0,100,102\n1,,98\n2,nan,97\n";
        let cols = read_csv_columns_from(data.as_bytes(), &["model", "meas"]).unwrap();
        assert_eq!(cols[0], vec![102.0, 98.0, 97.0]);
        assert_eq!(cols[1][0], 100.0);
        assert!(cols[1][1].is_nan());
        assert!(cols[1][2].is_nan());
    }

    #[test]
    fn unknown_column() {
        let err = read_csv_columns_from("a\n1\n".as_bytes(), &["b"]).unwrap_err();
        assert!(err.to_string().contains("'b'"));
    }
}
