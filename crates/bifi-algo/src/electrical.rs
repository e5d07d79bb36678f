//! Module power from effective irradiance and cell temperature.

use std::sync::Arc;

use bifi_core::{BifiResult, CecModuleParams};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::diode::{BrentMppSolver, DiodeParams, DiodeSolver};
use crate::profile::Profile;
use crate::thermal::{Mounting, ThermalModel, DEFAULT_WIND_SPEED};

/// Ambient and thermal settings shared by every power evaluation in a run.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatingConditions {
    /// Ambient temperature (°C); 25 °C when absent
    pub temp_air: Option<Profile>,
    /// Wind speed (m/s)
    pub wind_speed: Profile,
    /// Cell temperature (°C); overrides the thermal model when present
    pub temp_cell: Option<Profile>,
    pub mounting: Mounting,
}

impl Default for OperatingConditions {
    fn default() -> Self {
        Self {
            temp_air: None,
            wind_speed: Profile::Constant(DEFAULT_WIND_SPEED),
            temp_cell: None,
            mounting: Mounting::default(),
        }
    }
}

/// Maps (irradiance, cell temperature) pairs to maximum power, one per timestamp.
#[derive(Clone)]
pub struct ElectricalModel {
    solver: Arc<dyn DiodeSolver>,
}

impl Default for ElectricalModel {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ElectricalModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElectricalModel").finish_non_exhaustive()
    }
}

impl ElectricalModel {
    pub fn new() -> Self {
        Self::with_solver(Arc::new(BrentMppSolver::default()))
    }

    pub fn with_solver(solver: Arc<dyn DiodeSolver>) -> Self {
        Self { solver }
    }

    /// Cell temperature per timestamp: the supplied `temp_cell` if any,
    /// otherwise the thermal model.
    pub fn cell_temperature(
        &self,
        irradiance: &[f64],
        conditions: &OperatingConditions,
    ) -> BifiResult<Vec<f64>> {
        match &conditions.temp_cell {
            Some(temp_cell) => temp_cell.resolve(irradiance.len(), "irradiance vs cell temperature"),
            None => ThermalModel::new(conditions.mounting).cell_temperature(
                irradiance,
                conditions.temp_air.as_ref(),
                &conditions.wind_speed,
            ),
        }
    }

    /// Maximum power (W) per timestamp, aligned with `irradiance`.
    pub fn max_power(
        &self,
        irradiance: &[f64],
        module: &CecModuleParams,
        conditions: &OperatingConditions,
    ) -> BifiResult<Vec<f64>> {
        let temps = self.cell_temperature(irradiance, conditions)?;
        let solver = self.solver.as_ref();
        let solve = |(&s, &t): (&f64, &f64)| solver.max_power(&DiodeParams::from_cec(s, t, module));

        #[cfg(feature = "parallel")]
        let power = irradiance.par_iter().zip(temps.par_iter()).map(solve).collect();
        #[cfg(not(feature = "parallel"))]
        let power = irradiance.iter().zip(temps.iter()).map(solve).collect();

        power
    }
}

/// One-shot maximum power with the default solver.
pub fn max_power(
    irradiance: &[f64],
    module: &CecModuleParams,
    conditions: &OperatingConditions,
) -> BifiResult<Vec<f64>> {
    ElectricalModel::new().max_power(irradiance, module, conditions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::cs5p_220m;
    use bifi_core::BifiError;

    #[test]
    fn cell_temperature_overrides_thermal_model() {
        let conditions = OperatingConditions {
            temp_air: Some(Profile::Constant(40.0)),
            temp_cell: Some(Profile::Constant(25.0)),
            ..Default::default()
        };
        let power = max_power(&[1000.0], &cs5p_220m(), &conditions).unwrap();
        assert!((power[0] - 219.96).abs() < 0.1, "got {}", power[0]);
    }

    #[test]
    fn thermal_model_is_used_without_cell_temperature() {
        let power = max_power(&[883.5, 810.0, 605.0], &cs5p_220m(), &Default::default()).unwrap();
        let expected = [170.556, 158.789, 123.289];
        for (p, e) in power.iter().zip(expected) {
            assert!((p - e).abs() < 0.05, "got {p}, expected {e}");
        }
    }

    #[test]
    fn mismatched_cell_temperature_series() {
        let conditions = OperatingConditions {
            temp_cell: Some(Profile::Series(vec![25.0, 30.0])),
            ..Default::default()
        };
        let err = max_power(&[800.0, 900.0, 1000.0], &cs5p_220m(), &conditions).unwrap_err();
        assert!(matches!(err, BifiError::ShapeMismatch { expected: 3, found: 2, .. }));
    }

    #[test]
    fn output_stays_aligned() {
        let irradiance = [0.0, f64::NAN, 500.0, 1000.0];
        let power = max_power(&irradiance, &cs5p_220m(), &Default::default()).unwrap();
        assert_eq!(power.len(), 4);
        assert_eq!(power[0], 0.0);
        assert!(power[1].is_nan());
        assert!(power[2] > 0.0 && power[2] < power[3]);
    }

    struct FixedSolver;

    impl DiodeSolver for FixedSolver {
        fn max_power(&self, params: &DiodeParams) -> BifiResult<f64> {
            Ok(params.photocurrent)
        }
    }

    #[test]
    fn custom_solver_is_used() {
        let model = ElectricalModel::with_solver(Arc::new(FixedSolver));
        let conditions = OperatingConditions {
            temp_cell: Some(Profile::Constant(25.0)),
            ..Default::default()
        };
        let out = model.max_power(&[500.0], &cs5p_220m(), &conditions).unwrap();
        assert!((out[0] - 5.114 / 2.0).abs() < 1e-12);
    }
}
