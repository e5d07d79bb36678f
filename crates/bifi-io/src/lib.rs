//! # bifi-io: Scan and Result I/O
//!
//! Everything that touches text formats lives here so the pipeline only sees
//! typed grids and records.
//!
//! - [`list_cell`]: decoder for bracket-delimited list cells (`[800, 820]`)
//! - [`scan_file`]: delimited scan files (`Wm2Front`, `Wm2Back`, `mattype`, `rearMat`)
//! - [`results`]: JSON dumps of in-memory results keyed by row index
//! - [`source`]: [`ArraySource`], choosing between the two inputs
//! - [`cec`]: CEC module library lookup by name
//! - [`performance`]: CSV/JSON writers (and a polars DataFrame with the `polars` feature)
//! - [`series`]: numeric column reader for error-metric inputs

pub mod cec;
pub mod list_cell;
pub mod performance;
pub mod results;
pub mod scan_file;
pub mod series;
pub mod source;

pub use cec::{load_cec_module, read_cec_module};
pub use list_cell::{parse_numeric_list, parse_tag_list};
#[cfg(feature = "polars")]
pub use performance::performance_dataframe;
pub use performance::{write_performance_csv, write_performance_csv_to, write_performance_json};
pub use results::{read_scan_results_json, read_scan_results_reader};
pub use scan_file::{read_array_csv, read_array_reader};
pub use series::{read_csv_columns, read_csv_columns_from};
pub use source::ArraySource;
