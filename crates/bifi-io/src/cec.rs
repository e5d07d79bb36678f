//! CEC module library lookup.
//!
//! Libraries are CSV files with a `Name` column and the seven CEC coefficient
//! columns. SAM-style exports carry extra unit/metadata rows below the header;
//! they never match a module name and are skipped.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use bifi_core::{BifiError, BifiResult, CecModuleParams};
use csv::{ReaderBuilder, Trim};
use serde_json::Value;
use tracing::debug;

use crate::scan_file::csv_error;

/// Load the coefficients of module `name` from a library file.
pub fn load_cec_module(path: &Path, name: &str) -> BifiResult<CecModuleParams> {
    let file = File::open(path)?;
    read_cec_module(file, name)
}

pub fn read_cec_module<R: Read>(reader: R, name: &str) -> BifiResult<CecModuleParams> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);
    let headers = rdr.headers().map_err(csv_error)?.clone();
    let name_idx = headers
        .iter()
        .position(|h| h == "Name")
        .ok_or_else(|| BifiError::Parse("module library has no 'Name' column".to_string()))?;

    for record in rdr.records() {
        let record = record.map_err(csv_error)?;
        if record.get(name_idx) != Some(name) {
            continue;
        }
        debug!(module = name, "found module in CEC library");
        return CecModuleParams::from_lookup(|field| {
            let idx = headers.iter().position(|h| h == field)?;
            record
                .get(idx)
                .filter(|v| !v.is_empty())
                .map(|v| Value::String(v.to_string()))
        });
    }

    Err(BifiError::InvalidModuleParams(format!(
        "module '{name}' not found in library"
    )))
}
