//! Array-level performance from front/rear irradiance scans.
//!
//! One [`ArrayAggregator::run`] is a single pass over the scan:
//!
//! 1. **Load** the four grids from exactly one [`ArraySource`].
//! 2. **Mask** readings whose material tag marks structure or sky.
//! 3. **Aggregate** per timestamp: front mean, rear mean, and the blended
//!    per-position irradiance `rear · φ + Gfront_mean`, whose mean is `POA_eff`.
//! 4. **Model** power at `POA_eff` and at the front irradiance alone.
//! 5. **Derive** bifacial gains and the mismatch-reduced power.
//!
//! Missing readings are excluded from every mean, never counted as zero.
//! Division by a zero front irradiance surfaces as `NaN`/`Inf` in that row's
//! BGG/BGE rather than failing the run.

use std::sync::Arc;

use bifi_core::{
    ArrayScan, BifiError, BifiResult, CecModuleParams, IrradianceGrid, PerformanceRow,
    PerformanceTable,
};
use bifi_io::ArraySource;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::electrical::{ElectricalModel, OperatingConditions};
use crate::mismatch::{MadMismatchFit, MismatchEstimator, MismatchFit};
use crate::obstruction::ObstructionMatcher;
use crate::profile::Profile;
use crate::thermal::{Mounting, DEFAULT_WIND_SPEED};

/// Run-wide settings for one array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArraySettings {
    /// Rear-to-front efficiency ratio φ
    pub bifaciality_factor: f64,
    /// Ambient temperature (°C), scalar or per timestamp
    pub temp_air: Option<Profile>,
    /// Wind speed (m/s), scalar or per timestamp
    pub wind_speed: Profile,
    /// Cell temperature (°C); bypasses the thermal model
    pub temp_cell: Option<Profile>,
    pub mounting: Mounting,
    pub mismatch_fit: MismatchFit,
}

impl Default for ArraySettings {
    fn default() -> Self {
        Self {
            bifaciality_factor: 1.0,
            temp_air: None,
            wind_speed: Profile::Constant(DEFAULT_WIND_SPEED),
            temp_cell: None,
            mounting: Mounting::default(),
            mismatch_fit: MismatchFit::default(),
        }
    }
}

impl ArraySettings {
    pub fn conditions(&self) -> OperatingConditions {
        OperatingConditions {
            temp_air: self.temp_air.clone(),
            wind_speed: self.wind_speed.clone(),
            temp_cell: self.temp_cell.clone(),
            mounting: self.mounting,
        }
    }
}

/// Add the per-timestamp front mean to every rear position of that timestamp.
///
/// `rear` is timestamps × positions and `gfront` has one value per timestamp;
/// the result has the shape of `rear`.
pub fn blend_rear_with_front(
    rear: &IrradianceGrid,
    gfront: &[f64],
    bifaciality_factor: f64,
) -> BifiResult<IrradianceGrid> {
    if gfront.len() != rear.rows() {
        return Err(BifiError::shape("rear rows vs front means", rear.rows(), gfront.len()));
    }
    let mut blended = rear.clone();
    for (t, &front) in gfront.iter().enumerate() {
        for value in blended.row_mut(t) {
            *value = *value * bifaciality_factor + front;
        }
    }
    Ok(blended)
}

/// Drives masking, aggregation, the electrical model and the mismatch estimator.
#[derive(Clone)]
pub struct ArrayAggregator {
    bifaciality_factor: f64,
    conditions: OperatingConditions,
    matcher: ObstructionMatcher,
    electrical: ElectricalModel,
    mismatch: Arc<dyn MismatchEstimator>,
}

impl std::fmt::Debug for ArrayAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArrayAggregator")
            .field("bifaciality_factor", &self.bifaciality_factor)
            .field("conditions", &self.conditions)
            .field("matcher", &self.matcher)
            .finish_non_exhaustive()
    }
}

impl Default for ArrayAggregator {
    fn default() -> Self {
        Self::new(&ArraySettings::default())
    }
}

impl ArrayAggregator {
    pub fn new(settings: &ArraySettings) -> Self {
        Self {
            bifaciality_factor: settings.bifaciality_factor,
            conditions: settings.conditions(),
            matcher: ObstructionMatcher::default(),
            electrical: ElectricalModel::new(),
            mismatch: Arc::new(MadMismatchFit::new(settings.mismatch_fit)),
        }
    }

    pub fn with_matcher(mut self, matcher: ObstructionMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn with_electrical_model(mut self, electrical: ElectricalModel) -> Self {
        self.electrical = electrical;
        self
    }

    pub fn with_mismatch_estimator(mut self, mismatch: Arc<dyn MismatchEstimator>) -> Self {
        self.mismatch = mismatch;
        self
    }

    /// Load from `source` and compute the performance table.
    ///
    /// `front_only_module` models `Pout_Gfront`; `module` is used when absent.
    pub fn run(
        &self,
        source: &ArraySource<'_>,
        module: &CecModuleParams,
        front_only_module: Option<&CecModuleParams>,
    ) -> BifiResult<PerformanceTable> {
        let scan = source.load()?;
        self.run_scan(scan, module, front_only_module)
    }

    /// Compute the performance table for an already loaded scan.
    pub fn run_scan(
        &self,
        scan: ArrayScan,
        module: &CecModuleParams,
        front_only_module: Option<&CecModuleParams>,
    ) -> BifiResult<PerformanceTable> {
        scan.validate()?;
        let ArrayScan {
            mut front,
            mut rear,
            front_tags,
            rear_tags,
            meta,
            columns,
        } = scan;
        let timestamps = front.rows();
        info!(
            timestamps,
            front_positions = front.cols(),
            rear_positions = rear.cols(),
            "aggregating array scan"
        );

        let masked_front = self.matcher.apply(&mut front, &front_tags)?;
        let masked_rear = self.matcher.apply(&mut rear, &rear_tags)?;
        debug!(masked_front, masked_rear, "masked obstructed readings");

        let gfront = front.row_means();
        let grear = rear.row_means();
        let blended = blend_rear_with_front(&rear, &gfront, self.bifaciality_factor)?;
        let poa_eff = blended.row_means();

        let dark = gfront.iter().filter(|g| **g == 0.0 || g.is_nan()).count();
        if dark > 0 {
            warn!(dark, "timestamps without front irradiance; BGG/BGE will be NaN or infinite");
        }
        let blind_rear = grear.iter().filter(|g| g.is_nan()).count();
        if blind_rear > 0 {
            warn!(blind_rear, "timestamps with every rear reading masked or missing");
        }

        let pout = self.electrical.max_power(&poa_eff, module, &self.conditions)?;
        let pout_gfront = self.electrical.max_power(
            &gfront,
            front_only_module.unwrap_or(module),
            &self.conditions,
        )?;

        let mismatch = self.mismatch.mismatch_percent(&blended.transpose())?;
        if mismatch.len() != timestamps {
            return Err(BifiError::shape("timestamps vs mismatch estimates", timestamps, mismatch.len()));
        }

        let rows: Vec<PerformanceRow> = meta
            .into_iter()
            .enumerate()
            .map(|(t, meta)| PerformanceRow {
                timestamp: meta.timestamp,
                mod_number: meta.mod_number,
                row_num: meta.row_num,
                poa_eff: poa_eff[t],
                grear_mean: grear[t],
                gfront_mean: gfront[t],
                pout: pout[t],
                pout_gfront: pout_gfront[t],
                bgg: 100.0 * grear[t] / gfront[t],
                bge: 100.0 * (pout[t] - pout_gfront[t]) / pout_gfront[t],
                mismatch: mismatch[t],
                pout_red: pout[t] * (1.0 - mismatch[t] / 100.0),
            })
            .collect();

        debug!(rows = rows.len(), "performance table complete");
        Ok(PerformanceTable::new(columns, rows))
    }
}

/// One-shot run with default matcher, solver and mismatch estimator.
pub fn array_results(
    source: &ArraySource<'_>,
    module: &CecModuleParams,
    front_only_module: Option<&CecModuleParams>,
    settings: &ArraySettings,
) -> BifiResult<PerformanceTable> {
    ArrayAggregator::new(settings).run(source, module, front_only_module)
}
