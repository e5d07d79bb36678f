//! Electrical mismatch loss from non-uniform irradiance across positions.
//!
//! The estimator boundary is the [`MismatchEstimator`] trait: it receives the
//! whole positions × timestamps matrix in a single call and returns one loss
//! percentage per timestamp.
//!
//! [`MadMismatchFit`] is the empirical estimator: for each timestamp the mean
//! absolute difference of the irradiance across positions, normalized by its
//! mean, is mapped to a loss through a quadratic fit.
//!
//! ```text
//! Δ   = 100 · Σ_i Σ_j |G_i − G_j| / n² / mean(G)      (%)
//! M   = c₁ · Δ + c₂ · Δ²                               (%, capped at 100)
//! ```
//!
//! ## References
//!
//! - Deline, C., Ayala Pelaez, S., et al. (2020). "Bifacial PV System Mismatch
//!   Loss Estimation and Parameterization", Progress in Photovoltaics 28(7).

use bifi_core::{BifiResult, Grid};
use serde::{Deserialize, Serialize};

/// Per-timestamp mismatch loss from a positions × timestamps irradiance matrix.
pub trait MismatchEstimator: Send + Sync {
    fn mismatch_percent(&self, irradiance: &Grid<f64>) -> BifiResult<Vec<f64>>;
}

/// Quadratic fit coefficients relating Δ to mismatch loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MismatchFit {
    /// Single-row fit: M = 0.142·Δ + 0.032·Δ²
    Fit2,
    /// Array fit: M = 0.054·Δ + 0.068·Δ²
    #[default]
    Fit3,
}

impl MismatchFit {
    pub fn coefficients(self) -> (f64, f64) {
        match self {
            MismatchFit::Fit2 => (0.142, 0.032),
            MismatchFit::Fit3 => (0.054, 0.068),
        }
    }

    /// Loss (%) for a given Δ (%). `NaN` stays `NaN`.
    pub fn loss(self, mad_percent: f64) -> f64 {
        if mad_percent.is_nan() {
            return f64::NAN;
        }
        let (c1, c2) = self.coefficients();
        (c1 * mad_percent + c2 * mad_percent * mad_percent).min(100.0)
    }
}

/// Mean absolute difference over all ordered pairs, as a percent of the mean.
///
/// Missing values are skipped; `NaN` when nothing remains.
pub fn mad_percent(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return f64::NAN;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    // Σ_i Σ_j |x_i − x_j| = 2 · Σ_k (2k − n + 1) · x_(k) over ascending order
    let n = sorted.len() as f64;
    let pair_sum: f64 = sorted
        .iter()
        .enumerate()
        .map(|(k, x)| (2.0 * k as f64 - n + 1.0) * x)
        .sum::<f64>()
        * 2.0;
    let mean = sorted.iter().sum::<f64>() / n;
    pair_sum / (n * n) / mean * 100.0
}

/// Empirical MAD-based estimator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MadMismatchFit {
    pub fit: MismatchFit,
}

impl MadMismatchFit {
    pub fn new(fit: MismatchFit) -> Self {
        Self { fit }
    }
}

impl MismatchEstimator for MadMismatchFit {
    fn mismatch_percent(&self, irradiance: &Grid<f64>) -> BifiResult<Vec<f64>> {
        Ok((0..irradiance.cols())
            .map(|t| self.fit.loss(mad_percent(irradiance.column(t).copied())))
            .collect())
    }
}
