//! Window orchestration and result aggregation.

use std::collections::HashMap;

use chrono::Utc;
use tracing::debug;

use crate::config::constants::{DEFAULT_SLIDE_INTERVAL, DEFAULT_WINDOW_SIZE};
use crate::ident::{self, IdPrefix};
use crate::numeric::{mean, population_variance};
use crate::types::{PatternAnalysis, PatternType, TemporalPattern, TypeSummary};

use super::{
    burst::detect_bursts, cyclic::detect_cycles, decay::detect_decay,
    periodicity::detect_periodicity, trend::detect_trend, window::sliding_windows,
};

/// Windowing options for the temporal detector.
#[derive(Clone, Copy, Debug)]
pub struct TemporalOptions {
    /// Window length in samples.
    pub window_size: usize,
    /// Samples between consecutive window starts.
    pub slide_interval: usize,
}

impl Default for TemporalOptions {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            slide_interval: DEFAULT_SLIDE_INTERVAL,
        }
    }
}

/// Stateless temporal pattern detector.
///
/// Runs all five analyzers over every sliding window and aggregates the
/// emitted patterns. Deterministic: two runs over the same input produce the
/// same patterns (identifiers aside).
#[derive(Clone, Debug, Default)]
pub struct TemporalDetector {
    options: TemporalOptions,
}

impl TemporalDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TemporalOptions) -> Self {
        Self { options }
    }

    /// Analyze a sequence into a pattern result.
    ///
    /// Degenerate input (empty, shorter than one window, non-finite values)
    /// yields an empty result with confidence 0 rather than an error.
    pub fn analyze(&self, data: &[f64]) -> PatternAnalysis {
        let mut patterns = Vec::new();
        for window in sliding_windows(data, self.options.window_size, self.options.slide_interval)
        {
            if window.iter().any(|v| !v.is_finite()) {
                debug!("skipping window with non-finite values");
                continue;
            }
            patterns.extend(analyze_window(window));
        }

        let summary = summarize(&patterns);
        let dominant_pattern = patterns
            .iter()
            .max_by(|a, b| {
                a.strength()
                    .partial_cmp(&b.strength())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .cloned();
        let confidence = confidence(&patterns, &summary);

        PatternAnalysis {
            id: ident::mint(IdPrefix::Pattern),
            timestamp: Utc::now(),
            data_points: data.len(),
            patterns,
            summary,
            dominant_pattern,
            confidence,
        }
    }
}

/// Run every analyzer over one window.
fn analyze_window(window: &[f64]) -> Vec<TemporalPattern> {
    [
        detect_periodicity(window),
        detect_trend(window),
        detect_bursts(window),
        detect_decay(window),
        detect_cycles(window),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Group detected patterns by type with count and strength aggregates.
fn summarize(patterns: &[TemporalPattern]) -> HashMap<PatternType, TypeSummary> {
    let mut grouped: HashMap<PatternType, Vec<f64>> = HashMap::new();
    for pattern in patterns {
        grouped
            .entry(pattern.pattern_type())
            .or_default()
            .push(pattern.strength());
    }

    grouped
        .into_iter()
        .map(|(pattern_type, strengths)| {
            let max_strength = strengths.iter().cloned().fold(0.0, f64::max);
            (
                pattern_type,
                TypeSummary {
                    count: strengths.len(),
                    average_strength: mean(&strengths),
                    max_strength,
                },
            )
        })
        .collect()
}

/// Overall confidence: (mean strength + cross-type consistency) / 2.
///
/// Consistency per type is 1 - var/mean of that type's strengths (0.5 for a
/// singleton); the total is the mean across types. No patterns means 0.
fn confidence(
    patterns: &[TemporalPattern],
    summary: &HashMap<PatternType, TypeSummary>,
) -> f64 {
    if patterns.is_empty() {
        return 0.0;
    }

    let strengths: Vec<f64> = patterns.iter().map(TemporalPattern::strength).collect();
    let mean_strength = mean(&strengths);

    let per_type: Vec<f64> = summary
        .keys()
        .map(|pattern_type| {
            let type_strengths: Vec<f64> = patterns
                .iter()
                .filter(|p| p.pattern_type() == *pattern_type)
                .map(TemporalPattern::strength)
                .collect();
            if type_strengths.len() < 2 {
                return 0.5;
            }
            let type_mean = mean(&type_strengths);
            if type_mean == 0.0 {
                return 0.0;
            }
            (1.0 - population_variance(&type_strengths) / type_mean).clamp(0.0, 1.0)
        })
        .collect();
    let consistency = mean(&per_type);

    ((mean_strength + consistency) / 2.0).clamp(0.0, 1.0)
}
