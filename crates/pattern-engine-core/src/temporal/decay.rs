//! Exponential decay detection via log-linear regression.

use crate::numeric::linear_regression;
use crate::types::TemporalPattern;

/// Log-slope must be below this to count as decay.
const SLOPE_GATE: f64 = -0.01;

/// Fit quality gate.
const R_SQUARED_GATE: f64 = 0.85;

/// Detect exponential decline over the window.
///
/// Fits ln(y) against sample index. Windows containing non-positive values
/// are rejected outright: substituting a placeholder for an undefined
/// logarithm would bias the fit.
pub fn detect_decay(window: &[f64]) -> Option<TemporalPattern> {
    if window.len() < 2 || window.iter().any(|&v| v <= 0.0) {
        return None;
    }

    let xs: Vec<f64> = (0..window.len()).map(|i| i as f64).collect();
    let log_values: Vec<f64> = window.iter().map(|v| v.ln()).collect();
    let fit = linear_regression(&xs, &log_values);
    if fit.slope >= SLOPE_GATE || fit.r_squared <= R_SQUARED_GATE {
        return None;
    }

    let rate = -fit.slope;
    Some(TemporalPattern::Decay {
        rate,
        half_life: std::f64::consts::LN_2 / rate,
        r_squared: fit.r_squared,
        time_to_one_percent: 100f64.ln() / rate,
    })
}
