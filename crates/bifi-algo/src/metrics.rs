//! Accuracy metrics for measured vs modeled series.
//!
//! All four metrics share one filter: rows with a missing value on either side
//! are dropped, then rows whose modeled value does not exceed the smallest
//! measured value are dropped as unreliable (near-zero or clipped model output).
//! With `m` rows remaining and means taken over those rows:
//!
//! ```text
//! MBD_abs  = mean(model − meas)
//! RMSE_abs = sqrt(mean((model − meas)²))
//! MBD      = 100 · MBD_abs  / mean(meas)
//! RMSE     = 100 · RMSE_abs / mean(meas)
//! ```

use bifi_core::{BifiError, BifiResult};
use serde::{Deserialize, Serialize};

/// All four metrics from a single filtering pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorMetrics {
    /// Mean bias deviation (%)
    pub mbd: f64,
    /// Root mean square error (%)
    pub rmse: f64,
    /// Mean bias deviation in measurement units
    pub mbd_abs: f64,
    /// Root mean square error in measurement units
    pub rmse_abs: f64,
    /// Mean of the retained measurements
    pub meas_mean: f64,
    /// Rows kept after filtering
    pub samples: usize,
}

impl ErrorMetrics {
    pub fn compute(meas: &[f64], model: &[f64]) -> BifiResult<Self> {
        let pairs = filtered_pairs(meas, model)?;
        let m = pairs.len() as f64;
        let meas_mean = pairs.iter().map(|(x, _)| x).sum::<f64>() / m;
        let mbd_abs = pairs.iter().map(|(x, y)| y - x).sum::<f64>() / m;
        let rmse_abs = (pairs.iter().map(|(x, y)| (y - x).powi(2)).sum::<f64>() / m).sqrt();
        Ok(Self {
            mbd: 100.0 * mbd_abs / meas_mean,
            rmse: 100.0 * rmse_abs / meas_mean,
            mbd_abs,
            rmse_abs,
            meas_mean,
            samples: pairs.len(),
        })
    }
}

fn filtered_pairs(meas: &[f64], model: &[f64]) -> BifiResult<Vec<(f64, f64)>> {
    if meas.len() != model.len() {
        return Err(BifiError::shape("measured vs modeled", meas.len(), model.len()));
    }
    let min_meas = meas
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(f64::INFINITY, f64::min);

    let pairs: Vec<(f64, f64)> = meas
        .iter()
        .zip(model)
        .filter(|(x, y)| !x.is_nan() && !y.is_nan() && **y > min_meas)
        .map(|(&x, &y)| (x, y))
        .collect();

    if pairs.is_empty() {
        return Err(BifiError::EmptyInput(
            "no measured/modeled pairs left after filtering".to_string(),
        ));
    }
    Ok(pairs)
}

/// Mean bias deviation, percent of the mean measurement.
pub fn mbd(meas: &[f64], model: &[f64]) -> BifiResult<f64> {
    ErrorMetrics::compute(meas, model).map(|m| m.mbd)
}

/// Root mean square error, percent of the mean measurement.
pub fn rmse(meas: &[f64], model: &[f64]) -> BifiResult<f64> {
    ErrorMetrics::compute(meas, model).map(|m| m.rmse)
}

/// Mean bias deviation in measurement units.
pub fn mbd_abs(meas: &[f64], model: &[f64]) -> BifiResult<f64> {
    ErrorMetrics::compute(meas, model).map(|m| m.mbd_abs)
}

/// Root mean square error in measurement units.
pub fn rmse_abs(meas: &[f64], model: &[f64]) -> BifiResult<f64> {
    ErrorMetrics::compute(meas, model).map(|m| m.rmse_abs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_series_have_no_error() {
        let x = [120.0, 450.0, 800.0, 640.0];
        assert_eq!(mbd(&x, &x).unwrap(), 0.0);
        assert_eq!(rmse(&x, &x).unwrap(), 0.0);
    }

    #[test]
    fn filter_drops_missing_and_low_model_rows() {
        let meas = [100.0, 200.0, f64::NAN, 300.0, 400.0];
        let model = [50.0, 210.0, 500.0, f64::NAN, 380.0];
        // Kept rows: (200, 210) and (400, 380)
        let m = ErrorMetrics::compute(&meas, &model).unwrap();
        assert_eq!(m.samples, 2);
        assert!((m.meas_mean - 300.0).abs() < 1e-12);
        assert!((m.mbd_abs - (-5.0)).abs() < 1e-12);
        assert!((m.rmse_abs - (250.0f64).sqrt()).abs() < 1e-12);
        assert!((m.mbd - (-5.0 / 3.0)).abs() < 1e-12);
    }

    #[test]
    fn relative_and_absolute_agree() {
        let meas = [310.0, 560.0, 720.0, 905.0];
        let model = [330.0, 540.0, 760.0, 880.0];
        let m = ErrorMetrics::compute(&meas, &model).unwrap();
        assert!((m.mbd - 100.0 * m.mbd_abs / m.meas_mean).abs() < 1e-12);
        assert!((m.rmse - 100.0 * m.rmse_abs / m.meas_mean).abs() < 1e-12);
        assert!(m.rmse_abs >= m.mbd_abs.abs());
    }

    #[test]
    fn everything_filtered_is_empty_input() {
        let meas = [500.0, 600.0];
        let model = [400.0, 500.0];
        assert!(matches!(mbd(&meas, &model), Err(BifiError::EmptyInput(_))));
        assert!(matches!(rmse_abs(&[], &[]), Err(BifiError::EmptyInput(_))));
    }

    #[test]
    fn length_mismatch_is_reported_before_filtering() {
        let err = mbd_abs(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert!(matches!(err, BifiError::ShapeMismatch { expected: 2, found: 1, .. }));
    }
}
