//! # bifi-core: Bifacial Array Data Model
//!
//! Shared types for the bifacial array performance pipeline.
//!
//! ## Data Model
//!
//! - [`Grid`]: dense row-major table. Scan data uses rows = timestamps and
//!   columns = sensor positions; [`IrradianceGrid`] holds W/m² (missing = `NaN`)
//!   and [`MaterialGrid`] holds the surface label hit at each position.
//! - [`ArrayScan`]: front/rear irradiance plus their tag grids and the optional
//!   passthrough columns (`timestamp`, `ModNumber`, `rowNum`), validated for
//!   alignment at construction.
//! - [`ScanRecord`] / [`ScanResults`]: in-memory results keyed by row index.
//! - [`CecModuleParams`]: CEC single-diode coefficients at reference conditions.
//! - [`PerformanceRow`] / [`PerformanceTable`]: per-timestamp pipeline output.
//!
//! ## Error Handling
//!
//! All fallible functions return [`BifiResult`]; see [`error`] for the taxonomy.

pub mod error;
pub mod grid;
pub mod module;
pub mod performance;
pub mod scan;

pub use error::{BifiError, BifiResult};
pub use grid::{nan_mean, Grid, IrradianceGrid, MaterialGrid};
pub use module::{CecModuleParams, CEC_FIELDS};
pub use performance::{PerformanceRow, PerformanceTable, VALUE_COLUMNS};
pub use scan::{check_tagged, ArrayScan, MetaColumns, RowMeta, ScanRecord, ScanResults};
