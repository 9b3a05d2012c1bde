//! Variety measurement and the viability-model baseline.
//!
//! Variety is a complexity surrogate: |v|·ln(|v|+1) for scalars, the number
//! of distinct values for sequences. The [`VsmBaseline`] captures what the
//! model expects of incoming values and which deviations count as
//! violations.

use serde::{Deserialize, Serialize};

use crate::numeric::{interquartile_range, mean, quartiles, std_dev};
use crate::types::{VarietyViolation, VsmState};

/// Variety of a scalar value.
pub fn scalar_variety(value: f64) -> f64 {
    value.abs() * (value.abs() + 1.0).ln()
}

/// Variety of a sequence: the count of distinct values.
pub fn sequence_variety(values: &[f64]) -> f64 {
    let mut distinct: Vec<u64> = values.iter().map(|v| v.to_bits()).collect();
    distinct.sort_unstable();
    distinct.dedup();
    distinct.len() as f64
}

/// Expectations derived from a baseline sequence for the vsm method.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct VsmBaseline {
    /// Mean variety across baseline samples.
    pub expected_variety: f64,
    /// Spread of the baseline varieties.
    pub variety_std: f64,
    /// Nested control tiers the values are expected to span.
    pub recursion_depth: u32,
    /// Magnitude beyond which a value raises the algedonic channel.
    pub algedonic_threshold: f64,
    /// Tukey fences around the baseline: [Q1 - 1.5·IQR, Q3 + 1.5·IQR].
    pub viable_range: (f64, f64),
}

impl VsmBaseline {
    /// Derive expectations from a numeric baseline.
    pub fn from_series(baseline: &[f64], recursion_depth: u32) -> Self {
        let varieties: Vec<f64> = baseline.iter().map(|&v| scalar_variety(v)).collect();
        let magnitudes: Vec<f64> = baseline.iter().map(|v| v.abs()).collect();
        let (q1, q3) = quartiles(baseline);
        let iqr = interquartile_range(baseline);
        Self {
            expected_variety: mean(&varieties),
            variety_std: std_dev(&varieties),
            recursion_depth,
            algedonic_threshold: mean(&magnitudes) + 4.0 * std_dev(&magnitudes),
            viable_range: (q1 - 1.5 * iqr, q3 + 1.5 * iqr),
        }
    }

    /// Derive expectations from the current viability-model state, used when
    /// no explicit baseline accompanies a vsm detection.
    pub fn from_state(state: &VsmState, recursion_depth: u32) -> Self {
        Self::from_series(&state.level_varieties(), recursion_depth)
    }

    /// Variety of a value relative to the baseline expectation.
    pub fn variety_ratio(&self, value: f64) -> f64 {
        if self.expected_variety <= 0.0 {
            return 0.0;
        }
        scalar_variety(value) / self.expected_variety
    }

    /// The violation this value raises, if any.
    ///
    /// The algedonic condition dominates, then recursion breakdown, then the
    /// variety-ratio violations; a value matching several conditions reports
    /// the gravest one.
    pub fn violation(&self, value: f64) -> Option<VarietyViolation> {
        if value.abs() > self.algedonic_threshold {
            return Some(VarietyViolation::AlgedonicAlert);
        }
        let depth_offset = (value.abs() + 1.0).log2() - self.recursion_depth as f64;
        if depth_offset.abs() > 2.0 {
            return Some(VarietyViolation::RecursionBreakdown);
        }
        let ratio = self.variety_ratio(value);
        if ratio < 0.5 {
            return Some(VarietyViolation::InsufficientVariety);
        }
        if ratio > 2.0 {
            return Some(VarietyViolation::ExcessiveVariety);
        }
        None
    }
}
