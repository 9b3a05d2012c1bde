//! Cycle detection from zero crossings of the centered signal.

use crate::numeric::{mean, std_dev};
use crate::types::{CycleSpan, TemporalPattern};

/// Detect oscillation cycles over the window.
///
/// A cycle is the interval between consecutive sign changes of the
/// mean-centered sequence. At least two cycles are required. Regularity is
/// 1/(1 + cv) where cv is the coefficient of variation of cycle durations.
pub fn detect_cycles(window: &[f64]) -> Option<TemporalPattern> {
    if window.len() < 3 {
        return None;
    }

    let center = mean(window);
    let crossings: Vec<usize> = (1..window.len())
        .filter(|&i| (window[i - 1] - center) * (window[i] - center) < 0.0)
        .collect();

    let cycles: Vec<CycleSpan> = crossings
        .windows(2)
        .map(|pair| CycleSpan {
            start: pair[0],
            end: pair[1],
            duration: pair[1] - pair[0],
        })
        .collect();
    if cycles.len() < 2 {
        return None;
    }

    let durations: Vec<f64> = cycles.iter().map(|c| c.duration as f64).collect();
    let duration_mean = mean(&durations);
    let cv = if duration_mean == 0.0 {
        0.0
    } else {
        std_dev(&durations) / duration_mean
    };

    Some(TemporalPattern::Cyclic {
        cycles,
        regularity: 1.0 / (1.0 + cv),
        variability: cv,
    })
}
