//! Input selection for an array run: a scan file or in-memory results.

use std::path::Path;

use bifi_core::{ArrayScan, BifiError, BifiResult, ScanResults};
use tracing::warn;

use crate::scan_file::read_array_csv;

/// Where the scan comes from. At least one side must be set.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArraySource<'a> {
    pub file: Option<&'a Path>,
    pub results: Option<&'a ScanResults>,
}

impl<'a> ArraySource<'a> {
    pub fn file(path: &'a Path) -> Self {
        Self {
            file: Some(path),
            results: None,
        }
    }

    pub fn results(results: &'a ScanResults) -> Self {
        Self {
            file: None,
            results: Some(results),
        }
    }

    /// Decode the scan. The file takes precedence when both are given.
    pub fn load(&self) -> BifiResult<ArrayScan> {
        match (self.file, self.results) {
            (Some(path), results) => {
                if results.is_some() {
                    warn!(
                        file = %path.display(),
                        "both a scan file and in-memory results were given; using the file"
                    );
                }
                read_array_csv(path)
            }
            (None, Some(results)) => ArrayScan::from_results(results),
            (None, None) => Err(BifiError::NoInputProvided),
        }
    }
}
