//! Periodicity detection via autocorrelation peaks.

use std::f64::consts::TAU;

use crate::numeric::{autocorrelation, pearson};
use crate::types::TemporalPattern;

/// Autocorrelation a candidate lag must clear to count as a peak.
const PEAK_FLOOR: f64 = 0.5;

/// Strength gate below which no pattern is emitted.
const STRENGTH_GATE: f64 = 0.7;

/// Detect a dominant period in the window.
///
/// The period is the first local maximum of the autocorrelation at lag >= 1
/// with correlation above 0.5; its autocorrelation is the pattern strength,
/// gated at 0.7. The phase is taken from the shift (within a quarter period)
/// that best aligns a reference sine with the window.
pub fn detect_periodicity(window: &[f64]) -> Option<TemporalPattern> {
    let acf = autocorrelation(window);
    if acf.len() < 3 {
        return None;
    }

    let lag = (1..acf.len() - 1).find(|&lag| {
        acf[lag] > PEAK_FLOOR && acf[lag] > acf[lag - 1] && acf[lag] > acf[lag + 1]
    })?;

    let strength = acf[lag];
    if strength <= STRENGTH_GATE {
        return None;
    }

    let period = lag as f64;
    Some(TemporalPattern::Periodic {
        period,
        strength,
        frequency: 1.0 / period,
        phase: best_phase(window, period),
    })
}

/// Phase in radians of the best-aligned reference sine.
///
/// Searches integer shifts in [-period/4, +period/4] and maps the winning
/// shift to 2π·shift/period.
fn best_phase(window: &[f64], period: f64) -> f64 {
    let quarter = (period / 4.0) as i64;
    let mut best_shift = 0i64;
    let mut best_r = f64::NEG_INFINITY;
    for shift in -quarter..=quarter {
        let reference: Vec<f64> = (0..window.len())
            .map(|i| (TAU * (i as i64 + shift) as f64 / period).sin())
            .collect();
        let r = pearson(window, &reference);
        if r > best_r {
            best_r = r;
            best_shift = shift;
        }
    }
    TAU * best_shift as f64 / period
}
