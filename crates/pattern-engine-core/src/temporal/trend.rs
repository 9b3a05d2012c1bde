//! Trend detection by ordinary least squares.

use crate::numeric::linear_regression;
use crate::types::{TemporalPattern, TrendDirection};

/// |slope| below this classifies as flat.
const FLAT_SLOPE: f64 = 0.01;

/// Fit quality gate.
const R_SQUARED_GATE: f64 = 0.8;

/// Detect a linear trend over the window.
///
/// Regresses values on sample index and emits only when r² clears 0.8.
pub fn detect_trend(window: &[f64]) -> Option<TemporalPattern> {
    let xs: Vec<f64> = (0..window.len()).map(|i| i as f64).collect();
    let fit = linear_regression(&xs, window);
    if fit.r_squared <= R_SQUARED_GATE {
        return None;
    }

    let direction = if fit.slope.abs() < FLAT_SLOPE {
        TrendDirection::Flat
    } else if fit.slope > 0.0 {
        TrendDirection::Increasing
    } else {
        TrendDirection::Decreasing
    };

    Some(TemporalPattern::Trend {
        direction,
        slope: fit.slope,
        r_squared: fit.r_squared,
        rate: fit.slope.abs(),
    })
}
