//! Single-diode model: CEC parameter translation and maximum power point.
//!
//! ## Parameter translation
//!
//! Reference coefficients are moved to the operating point (S, T_cell) with
//! the De Soto relations used by the CEC module database:
//!
//! ```text
//! ΔT      = T_cell,K − T_ref,K
//! E_g     = 1.121 · (1 − 0.0002677 · ΔT)                       (eV)
//! nNsVth  = a_ref · T_cell,K / T_ref,K
//! I_L     = S / S_ref · (I_L_ref + α_sc · (1 − Adjust/100) · ΔT)
//! I_0     = I_o_ref · (T_cell,K / T_ref,K)³ · exp(E_g,ref / (k·T_ref,K) − E_g / (k·T_cell,K))
//! R_sh    = R_sh_ref · S_ref / S
//! R_s     = R_s
//! ```
//!
//! ## Maximum power point
//!
//! The I-V curve is parametrized by the diode voltage V_d:
//!
//! ```text
//! I(V_d) = I_L − I_0 · (exp(V_d / nNsVth) − 1) − V_d / R_sh
//! V(V_d) = V_d − I(V_d) · R_s
//! ```
//!
//! [`BrentMppSolver`] brackets the open-circuit diode voltage with a Brent root
//! search on I(V_d) = 0, then maximizes V·I over [0, V_oc] with Brent's method.
//!
//! ## References
//!
//! - De Soto, W., Klein, S. A., Beckman, W. A. (2006). "Improvement and
//!   validation of a model for photovoltaic array performance", Solar Energy 80(1).
//! - Bishop, J. W. (1988). "Computer simulation of the effects of electrical
//!   mismatches in photovoltaic cell interconnection circuits", Solar Cells 25(1).

use argmin::core::{CostFunction, Executor, State};
use argmin::solver::brent::{BrentOpt, BrentRoot};
use bifi_core::{BifiError, BifiResult, CecModuleParams};

/// Boltzmann constant over elementary charge (eV/K).
const BOLTZMANN_EV: f64 = 8.617_333_262e-5;
/// Band gap at reference temperature for crystalline silicon (eV).
const EG_REF: f64 = 1.121;
/// Band gap temperature dependence (1/K).
const D_EG_DT: f64 = -0.0002677;
/// Reference irradiance (W/m²).
pub const IRRADIANCE_REF: f64 = 1000.0;
/// Reference cell temperature (°C).
pub const TEMP_REF: f64 = 25.0;
const KELVIN: f64 = 273.15;

/// The five single-diode parameters at one operating point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiodeParams {
    /// Light-generated current I_L (A)
    pub photocurrent: f64,
    /// Diode saturation current I_0 (A)
    pub saturation_current: f64,
    /// Series resistance R_s (Ω)
    pub resistance_series: f64,
    /// Shunt resistance R_sh (Ω); infinite in the dark
    pub resistance_shunt: f64,
    /// Product of ideality factor, cells in series and thermal voltage (V)
    pub n_ns_vth: f64,
}

impl DiodeParams {
    /// Translate CEC reference coefficients to irradiance `irradiance` (W/m²)
    /// and cell temperature `temp_cell` (°C).
    pub fn from_cec(irradiance: f64, temp_cell: f64, module: &CecModuleParams) -> Self {
        let t_ref = TEMP_REF + KELVIN;
        let t_cell = temp_cell + KELVIN;
        let delta_t = t_cell - t_ref;
        let alpha_sc = module.alpha_sc * (1.0 - module.adjust / 100.0);

        let band_gap = EG_REF * (1.0 + D_EG_DT * delta_t);
        let ratio = t_cell / t_ref;
        let saturation_current = module.i_o_ref
            * ratio.powi(3)
            * (EG_REF / (BOLTZMANN_EV * t_ref) - band_gap / (BOLTZMANN_EV * t_cell)).exp();

        let (photocurrent, resistance_shunt) = if irradiance > 0.0 {
            (
                irradiance / IRRADIANCE_REF * (module.i_l_ref + alpha_sc * delta_t),
                module.r_sh_ref * IRRADIANCE_REF / irradiance,
            )
        } else if irradiance.is_nan() {
            (f64::NAN, f64::NAN)
        } else {
            (0.0, f64::INFINITY)
        };

        Self {
            photocurrent,
            saturation_current,
            resistance_series: module.r_s,
            resistance_shunt,
            n_ns_vth: module.a_ref * ratio,
        }
    }

    pub fn has_nan(&self) -> bool {
        self.photocurrent.is_nan()
            || self.saturation_current.is_nan()
            || self.resistance_series.is_nan()
            || self.resistance_shunt.is_nan()
            || self.n_ns_vth.is_nan()
    }

    /// Terminal current at diode voltage `vd`.
    pub fn current_at(&self, vd: f64) -> f64 {
        self.photocurrent
            - self.saturation_current * (vd / self.n_ns_vth).exp_m1()
            - vd / self.resistance_shunt
    }

    /// Terminal power at diode voltage `vd`.
    pub fn power_at(&self, vd: f64) -> f64 {
        let current = self.current_at(vd);
        (vd - current * self.resistance_series) * current
    }
}

/// Solves the single-diode equation for its maximum power point.
pub trait DiodeSolver: Send + Sync {
    /// Maximum power (W). `NaN` inputs give `NaN`; no photocurrent gives zero.
    fn max_power(&self, params: &DiodeParams) -> BifiResult<f64>;
}

/// Brent root search for V_oc followed by Brent maximization of power.
#[derive(Debug, Clone, Copy)]
pub struct BrentMppSolver {
    pub tolerance: f64,
    pub max_iters: u64,
}

impl Default for BrentMppSolver {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iters: 200,
        }
    }
}

struct DiodeCurrent(DiodeParams);

impl CostFunction for DiodeCurrent {
    type Param = f64;
    type Output = f64;

    fn cost(&self, vd: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        Ok(self.0.current_at(*vd))
    }
}

struct NegativePower(DiodeParams);

impl CostFunction for NegativePower {
    type Param = f64;
    type Output = f64;

    fn cost(&self, vd: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        Ok(-self.0.power_at(*vd))
    }
}

fn solver_error(stage: &str, err: argmin::core::Error) -> BifiError {
    BifiError::Solver(format!("{stage}: {err}"))
}

impl BrentMppSolver {
    /// Diode voltage at open circuit (equal to V_oc since I = 0 there).
    pub fn open_circuit_voltage(&self, params: &DiodeParams) -> BifiResult<f64> {
        // Upper bound ignoring shunt loss; the shunt term only pulls the root lower
        let mut upper =
            params.n_ns_vth * (params.photocurrent / params.saturation_current).ln_1p();
        let mut expansions = 0;
        while params.current_at(upper) > 0.0 {
            upper *= 1.05;
            expansions += 1;
            if expansions > 60 || !upper.is_finite() {
                return Err(BifiError::Solver(format!(
                    "could not bracket open-circuit voltage for {params:?}"
                )));
            }
        }

        let result = Executor::new(
            DiodeCurrent(*params),
            BrentRoot::new(0.0, upper, self.tolerance),
        )
        .configure(|state| state.max_iters(self.max_iters))
        .run()
        .map_err(|e| solver_error("open-circuit voltage", e))?;

        result
            .state()
            .get_best_param()
            .copied()
            .ok_or_else(|| BifiError::Solver("open-circuit search returned no point".to_string()))
    }
}

impl DiodeSolver for BrentMppSolver {
    fn max_power(&self, params: &DiodeParams) -> BifiResult<f64> {
        if params.has_nan() {
            return Ok(f64::NAN);
        }
        if params.photocurrent <= 0.0 {
            return Ok(0.0);
        }

        let voc = self.open_circuit_voltage(params)?;
        if voc <= 0.0 {
            return Ok(0.0);
        }

        let result = Executor::new(
            NegativePower(*params),
            BrentOpt::new(0.0, voc).set_tolerance(f64::EPSILON.sqrt(), self.tolerance),
        )
        .configure(|state| state.max_iters(self.max_iters))
        .run()
        .map_err(|e| solver_error("maximum power point", e))?;

        let vd_mp = result
            .state()
            .get_best_param()
            .copied()
            .ok_or_else(|| BifiError::Solver("power search returned no point".to_string()))?;
        Ok(params.power_at(vd_mp).max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::cs5p_220m;

    #[test]
    fn reference_conditions_keep_reference_values() {
        let module = cs5p_220m();
        let p = DiodeParams::from_cec(IRRADIANCE_REF, TEMP_REF, &module);
        assert!((p.photocurrent - module.i_l_ref).abs() < 1e-12);
        assert!((p.saturation_current - module.i_o_ref).abs() < 1e-22);
        assert!((p.resistance_shunt - module.r_sh_ref).abs() < 1e-9);
        assert!((p.n_ns_vth - module.a_ref).abs() < 1e-12);
    }

    #[test]
    fn dark_module_has_no_photocurrent() {
        let p = DiodeParams::from_cec(0.0, 25.0, &cs5p_220m());
        assert_eq!(p.photocurrent, 0.0);
        assert!(p.resistance_shunt.is_infinite());
        assert_eq!(BrentMppSolver::default().max_power(&p).unwrap(), 0.0);
    }

    #[test]
    fn nameplate_power_at_stc() {
        let p = DiodeParams::from_cec(1000.0, 25.0, &cs5p_220m());
        let solver = BrentMppSolver::default();
        let voc = solver.open_circuit_voltage(&p).unwrap();
        assert!((voc - 59.40).abs() < 0.05, "voc {voc}");
        let pmp = solver.max_power(&p).unwrap();
        assert!((pmp - 219.96).abs() < 0.1, "pmp {pmp}");
    }

    #[test]
    fn hotter_cells_produce_less() {
        let solver = BrentMppSolver::default();
        let cool = solver
            .max_power(&DiodeParams::from_cec(1000.0, 25.0, &cs5p_220m()))
            .unwrap();
        let hot = solver
            .max_power(&DiodeParams::from_cec(1000.0, 50.0, &cs5p_220m()))
            .unwrap();
        assert!((hot - 192.97).abs() < 0.1, "hot {hot}");
        assert!(hot < cool);
    }

    #[test]
    fn nan_irradiance_gives_nan() {
        let p = DiodeParams::from_cec(f64::NAN, 25.0, &cs5p_220m());
        assert!(BrentMppSolver::default().max_power(&p).unwrap().is_nan());
    }
}
