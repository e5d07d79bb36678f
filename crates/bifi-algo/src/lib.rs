//! # bifi-algo: Bifacial Array Performance Pipeline
//!
//! Turns front/rear irradiance scans into per-timestamp power and bifacial gain.
//!
//! ## Pipeline
//!
//! [`ArrayAggregator`] drives one run:
//!
//! | Stage | Component | Output |
//! |-------|-----------|--------|
//! | Mask | [`ObstructionMatcher`] | obstructed readings set to `NaN` |
//! | Aggregate | [`blend_rear_with_front`] | `Gfront_mean`, `Grear_mean`, `POA_eff` |
//! | Thermal | [`ThermalModel`] | SAPM cell temperature |
//! | Electrical | [`ElectricalModel`] + [`DiodeSolver`] | `Pout`, `Pout_Gfront` |
//! | Mismatch | [`MismatchEstimator`] | `Mismatch`, `Pout_red` |
//!
//! The solver and the mismatch estimator are trait seams; [`BrentMppSolver`]
//! and [`MadMismatchFit`] are the defaults.
//!
//! ## Validation
//!
//! [`ErrorMetrics`] compares a modeled series against measurements (MBD and
//! RMSE, relative and absolute).
//!
//! ## Features
//!
//! - `parallel` (default): per-timestamp power evaluation on the rayon pool.
//!
//! ## Example
//!
//! ```ignore
//! use bifi_algo::{array_results, ArraySettings};
//! use bifi_io::{load_cec_module, ArraySource};
//!
//! let module = load_cec_module("CEC Modules.csv".as_ref(), "Canadian Solar CS5P-220M")?;
//! let settings = ArraySettings { bifaciality_factor: 0.7, ..Default::default() };
//! let table = array_results(&ArraySource::file("scan.csv".as_ref()), &module, None, &settings)?;
//! println!("{:?}", table.series("BGE"));
//! ```

pub mod aggregate;
pub mod diode;
pub mod electrical;
pub mod metrics;
pub mod mismatch;
pub mod obstruction;
pub mod profile;
pub mod test_utils;
pub mod thermal;

pub use aggregate::{array_results, blend_rear_with_front, ArrayAggregator, ArraySettings};
pub use diode::{BrentMppSolver, DiodeParams, DiodeSolver};
pub use electrical::{max_power, ElectricalModel, OperatingConditions};
pub use metrics::{mbd, mbd_abs, rmse, rmse_abs, ErrorMetrics};
pub use mismatch::{mad_percent, MadMismatchFit, MismatchEstimator, MismatchFit};
pub use obstruction::{ObstructionMatcher, OBSTRUCTION_MARKERS};
pub use profile::Profile;
pub use thermal::{sapm_cell_temperature, Mounting, SapmCoefficients, ThermalModel};
