//! Cell temperature from ambient conditions (Sandia array performance model).
//!
//! ```text
//! T_module = E · exp(a + b · WS) + T_air
//! T_cell   = T_module + E / 1000 · ΔT
//! ```
//!
//! with E the effective irradiance (W/m²), WS the wind speed (m/s) and the
//! coefficient triple (a, b, ΔT) chosen by the module's mounting/packaging.
//!
//! ## References
//!
//! - King, D. L., Boyson, W. E., Kratochvil, J. A. (2004). "Photovoltaic Array
//!   Performance Model", SAND2004-3535, Sandia National Laboratories.

use bifi_core::BifiResult;
use serde::{Deserialize, Serialize};

use crate::profile::Profile;

/// Ambient temperature assumed when none is given (°C).
pub const REFERENCE_TEMP_AIR: f64 = 25.0;

/// Default wind speed (m/s).
pub const DEFAULT_WIND_SPEED: f64 = 1.0;

/// Empirical coefficients of the SAPM module-temperature correlation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SapmCoefficients {
    pub a: f64,
    pub b: f64,
    pub delta_t: f64,
}

/// Open-rack package configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mounting {
    /// Open rack, glass/glass
    GlassGlass,
    /// Open rack, glass/polymer backsheet
    #[default]
    GlassPolymer,
}

impl Mounting {
    pub fn from_glass_glass(glass_glass: bool) -> Self {
        if glass_glass {
            Mounting::GlassGlass
        } else {
            Mounting::GlassPolymer
        }
    }

    pub fn coefficients(self) -> SapmCoefficients {
        match self {
            Mounting::GlassGlass => SapmCoefficients {
                a: -3.47,
                b: -0.0594,
                delta_t: 3.0,
            },
            Mounting::GlassPolymer => SapmCoefficients {
                a: -3.56,
                b: -0.0750,
                delta_t: 3.0,
            },
        }
    }
}

/// Cell temperature (°C) for a single operating point. `NaN` propagates.
pub fn sapm_cell_temperature(
    irradiance: f64,
    temp_air: f64,
    wind_speed: f64,
    coeffs: SapmCoefficients,
) -> f64 {
    let module = irradiance * (coeffs.a + coeffs.b * wind_speed).exp() + temp_air;
    module + irradiance / 1000.0 * coeffs.delta_t
}

/// Elementwise cell temperature over an irradiance series.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThermalModel {
    pub mounting: Mounting,
}

impl ThermalModel {
    pub fn new(mounting: Mounting) -> Self {
        Self { mounting }
    }

    /// Output has the same length as `irradiance`. A missing `temp_air`
    /// means [`REFERENCE_TEMP_AIR`]; series profiles must match in length.
    pub fn cell_temperature(
        &self,
        irradiance: &[f64],
        temp_air: Option<&Profile>,
        wind_speed: &Profile,
    ) -> BifiResult<Vec<f64>> {
        let reference = Profile::Constant(REFERENCE_TEMP_AIR);
        let temp_air = temp_air.unwrap_or(&reference);
        temp_air.check_len(irradiance.len(), "irradiance vs ambient temperature")?;
        wind_speed.check_len(irradiance.len(), "irradiance vs wind speed")?;

        let coeffs = self.mounting.coefficients();
        Ok(irradiance
            .iter()
            .enumerate()
            .map(|(i, &e)| {
                sapm_cell_temperature(e, temp_air.value_at(i), wind_speed.value_at(i), coeffs)
            })
            .collect())
    }
}
