//! JSON dumps of in-memory scan results (`{"0": {"Wm2Front": [...], ...}, ...}`).

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use bifi_core::{BifiError, BifiResult, ScanResults};

pub fn read_scan_results_json(path: &Path) -> BifiResult<ScanResults> {
    let file = File::open(path)?;
    read_scan_results_reader(BufReader::new(file)).map_err(|err| match err {
        BifiError::Parse(msg) => BifiError::Parse(format!("{}: {msg}", path.display())),
        other => other,
    })
}

pub fn read_scan_results_reader<R: Read>(reader: R) -> BifiResult<ScanResults> {
    Ok(serde_json::from_reader(reader)?)
}
