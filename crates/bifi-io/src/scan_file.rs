//! Delimited scan files.
//!
//! Required columns: `Wm2Front`, `Wm2Back` (numeric list cells) and `mattype`,
//! `rearMat` (label list cells). Optional passthrough columns: `timestamp`,
//! `ModNumber`, `Row` (emitted downstream as `rowNum`).

use std::fs::File;
use std::io::Read;
use std::path::Path;

use bifi_core::{
    check_tagged, ArrayScan, BifiError, BifiResult, IrradianceGrid, MaterialGrid, MetaColumns,
    RowMeta,
};
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::list_cell::{parse_numeric_list, parse_tag_list};

pub(crate) fn csv_error(err: csv::Error) -> BifiError {
    BifiError::Parse(err.to_string())
}

fn at_row(row: usize, err: BifiError) -> BifiError {
    match err {
        BifiError::Parse(msg) => BifiError::Parse(format!("row {row}: {msg}")),
        other => other,
    }
}

fn field(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or("")
}

fn optional_text(record: &StringRecord, idx: Option<usize>) -> Option<String> {
    let value = field(record, idx?).trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn optional_int(record: &StringRecord, idx: Option<usize>) -> BifiResult<Option<i64>> {
    let Some(idx) = idx else {
        return Ok(None);
    };
    let value = field(record, idx).trim();
    if value.is_empty() {
        return Ok(None);
    }
    if let Ok(v) = value.parse::<i64>() {
        return Ok(Some(v));
    }
    // Integer columns written through a float dtype come back as "3.0"
    match value.parse::<f64>() {
        Ok(v) if v.fract() == 0.0 => Ok(Some(v as i64)),
        _ => Err(BifiError::Parse(format!("'{value}' is not an integer"))),
    }
}

/// Read a scan file from disk.
pub fn read_array_csv(path: &Path) -> BifiResult<ArrayScan> {
    let file = File::open(path)?;
    read_array_reader(file).map_err(|err| match err {
        BifiError::Parse(msg) => BifiError::Parse(format!("{}: {msg}", path.display())),
        other => other,
    })
}

/// Read a scan file from any reader.
pub fn read_array_reader<R: Read>(reader: R) -> BifiResult<ArrayScan> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::Headers)
        .from_reader(reader);
    let headers = rdr.headers().map_err(csv_error)?.clone();
    let find = |name: &str| headers.iter().position(|h| h == name);
    let required = |name: &str| {
        find(name).ok_or_else(|| BifiError::Parse(format!("missing required column '{name}'")))
    };

    let front_idx = required("Wm2Front")?;
    let back_idx = required("Wm2Back")?;
    let mat_idx = required("mattype")?;
    let rear_mat_idx = required("rearMat")?;
    let ts_idx = find("timestamp");
    let mod_idx = find("ModNumber");
    let row_idx = find("Row");

    let mut front = Vec::new();
    let mut rear = Vec::new();
    let mut front_tags = Vec::new();
    let mut rear_tags = Vec::new();
    let mut meta = Vec::new();

    for (i, record) in rdr.records().enumerate() {
        let record = record.map_err(csv_error)?;
        let row = i + 1;
        let front_row = parse_numeric_list(field(&record, front_idx)).map_err(|e| at_row(row, e))?;
        let rear_row = parse_numeric_list(field(&record, back_idx)).map_err(|e| at_row(row, e))?;
        let front_tag_row = parse_tag_list(field(&record, mat_idx));
        let rear_tag_row = parse_tag_list(field(&record, rear_mat_idx));
        check_tagged(row, "front", &front_row, &front_tag_row)?;
        check_tagged(row, "rear", &rear_row, &rear_tag_row)?;
        front.push(front_row);
        rear.push(rear_row);
        front_tags.push(front_tag_row);
        rear_tags.push(rear_tag_row);
        meta.push(RowMeta {
            timestamp: optional_text(&record, ts_idx),
            mod_number: optional_int(&record, mod_idx).map_err(|e| at_row(row, e))?,
            row_num: optional_int(&record, row_idx).map_err(|e| at_row(row, e))?,
        });
    }

    let columns = MetaColumns {
        timestamp: ts_idx.is_some(),
        mod_number: mod_idx.is_some(),
        row_num: row_idx.is_some(),
    };
    let scan = ArrayScan::with_meta(
        IrradianceGrid::from_rows(front, f64::NAN),
        IrradianceGrid::from_rows(rear, f64::NAN),
        MaterialGrid::from_rows(front_tags, String::new()),
        MaterialGrid::from_rows(rear_tags, String::new()),
        meta,
        columns,
    )?;
    debug!(
        timestamps = scan.timestamps(),
        front_positions = scan.front.cols(),
        rear_positions = scan.rear.cols(),
        "decoded scan file"
    );
    Ok(scan)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCAN: &str = "\
timestamp,ModNumber,Row,Wm2Front,Wm2Back,mattype,rearMat
2021-06-01 12:00,10,2,\"[800, 820]\",\"[100, 110]\",\"[glass, glass]\",\"[glass, glass]\"
2021-06-01 13:00,10,2,\"[600, 610]\",\"[80, 90]\",\"[glass, glass]\",\"[ground123, glass]\"
";

    #[test]
    fn reads_lists_and_passthrough_columns() {
        let scan = read_array_reader(SCAN.as_bytes()).unwrap();
        assert_eq!(scan.timestamps(), 2);
        assert_eq!(scan.front.row(0), &[800.0, 820.0]);
        assert_eq!(scan.rear.row(1), &[80.0, 90.0]);
        assert_eq!(scan.rear_tags.row(1)[0], "ground123");
        assert!(scan.columns.timestamp && scan.columns.mod_number && scan.columns.row_num);
        assert_eq!(scan.meta[0].timestamp.as_deref(), Some("2021-06-01 12:00"));
        assert_eq!(scan.meta[1].row_num, Some(2));
    }

    #[test]
    fn missing_required_column() {
        let data = "Wm2Front,Wm2Back,mattype\n\"[1]\",\"[1]\",\"[a]\"\n";
        let err = read_array_reader(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("rearMat"));
    }

    #[test]
    fn bad_number_reports_row() {
        let data = "Wm2Front,Wm2Back,mattype,rearMat\n\"[1]\",\"[1]\",\"[a]\",\"[a]\"\n\"[x]\",\"[1]\",\"[a]\",\"[a]\"\n";
        let err = read_array_reader(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn untagged_reading_in_one_row_is_rejected() {
        let data = "Wm2Front,Wm2Back,mattype,rearMat\n\
\"[800, 820, 815]\",\"[100, 110, 104]\",\"[a, a, a]\",\"[a, a, a]\"\n\
\"[600, 610]\",\"[80, 90, 5]\",\"[a, a]\",\"[a, a]\"\n";
        let err = read_array_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, BifiError::ShapeMismatch { expected: 3, found: 2, .. }));
        assert!(err.to_string().contains("row 2: rear irradiance vs rear tags"));
    }

    #[test]
    fn float_encoded_integers() {
        let data = "Wm2Front,Wm2Back,mattype,rearMat,Row\n\"[1]\",\"[1]\",\"[a]\",\"[a]\",3.0\n";
        let scan = read_array_reader(data.as_bytes()).unwrap();
        assert_eq!(scan.meta[0].row_num, Some(3));
        assert!(!scan.columns.timestamp);
    }
}
