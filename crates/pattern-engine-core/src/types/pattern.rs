//! Temporal pattern records.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pattern family, used as the grouping key in per-type summaries.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    Periodic,
    Trend,
    Burst,
    Decay,
    Cyclic,
}

/// Direction of a fitted trend.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Flat,
    Increasing,
    Decreasing,
}

/// A single sample exceeding the burst threshold.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct BurstInstance {
    /// Index of the sample within the analyzed window.
    pub index: usize,
    /// Excess over the window mean.
    pub magnitude: f64,
}

/// One cycle between consecutive zero crossings.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleSpan {
    /// Index of the opening crossing.
    pub start: usize,
    /// Index of the closing crossing.
    pub end: usize,
    /// Samples between the crossings.
    pub duration: usize,
}

/// A detected temporal pattern.
///
/// Tagged variant; dispatch on the variant, never on field presence.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TemporalPattern {
    /// Repeating structure found via autocorrelation.
    Periodic {
        /// Dominant period in samples (> 0).
        period: f64,
        /// Autocorrelation at the period, in [0, 1].
        strength: f64,
        /// 1 / period.
        frequency: f64,
        /// Phase offset in radians against a reference sine.
        phase: f64,
    },
    /// Linear drift fitted by ordinary least squares.
    Trend {
        direction: TrendDirection,
        slope: f64,
        r_squared: f64,
        /// Absolute change per sample.
        rate: f64,
    },
    /// Samples exceeding mean + 2·std.
    Burst {
        instances: Vec<BurstInstance>,
        /// Total burst magnitude relative to signal magnitude, in [0, 1].
        strength: f64,
        count: usize,
        average_magnitude: f64,
    },
    /// Exponential decline fitted in log space.
    Decay {
        /// Decay rate (> 0); the fitted log-slope is its negation.
        rate: f64,
        /// ln 2 / rate.
        half_life: f64,
        r_squared: f64,
        /// Projected samples until 1% of the initial level remains.
        time_to_one_percent: f64,
    },
    /// Oscillation measured between zero crossings of the centered signal.
    Cyclic {
        cycles: Vec<CycleSpan>,
        /// 1 / (1 + cv) of the cycle durations, in [0, 1].
        regularity: f64,
        /// Coefficient of variation of the cycle durations.
        variability: f64,
    },
}

impl TemporalPattern {
    /// Pattern family of this record.
    pub fn pattern_type(&self) -> PatternType {
        match self {
            Self::Periodic { .. } => PatternType::Periodic,
            Self::Trend { .. } => PatternType::Trend,
            Self::Burst { .. } => PatternType::Burst,
            Self::Decay { .. } => PatternType::Decay,
            Self::Cyclic { .. } => PatternType::Cyclic,
        }
    }

    /// Uniform strength in [0, 1] used for ranking and summaries.
    ///
    /// Fit-based variants report their r²; the rest carry an explicit
    /// strength.
    pub fn strength(&self) -> f64 {
        match self {
            Self::Periodic { strength, .. } => *strength,
            Self::Trend { r_squared, .. } => *r_squared,
            Self::Burst { strength, .. } => *strength,
            Self::Decay { r_squared, .. } => *r_squared,
            Self::Cyclic { regularity, .. } => *regularity,
        }
    }
}

/// Per-type aggregate over the detected patterns.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct TypeSummary {
    pub count: usize,
    pub average_strength: f64,
    pub max_strength: f64,
}

/// Result of a full temporal analysis over one input sequence.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PatternAnalysis {
    /// Minted `pat_` identifier.
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Length of the original input.
    pub data_points: usize,
    /// Patterns across all windows, in window order.
    pub patterns: Vec<TemporalPattern>,
    pub summary: HashMap<PatternType, TypeSummary>,
    /// Highest-strength pattern, if any were detected.
    pub dominant_pattern: Option<TemporalPattern>,
    /// Overall confidence in [0, 1]; 0 when no patterns were found.
    pub confidence: f64,
}

impl PatternAnalysis {
    /// Strength of the dominant pattern, or 0 when none was found.
    pub fn dominant_strength(&self) -> f64 {
        self.dominant_pattern
            .as_ref()
            .map(TemporalPattern::strength)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn periodic(strength: f64) -> TemporalPattern {
        TemporalPattern::Periodic {
            period: 10.0,
            strength,
            frequency: 0.1,
            phase: 0.0,
        }
    }

    #[test]
    fn test_strength_accessor_per_variant() {
        assert_eq!(periodic(0.9).strength(), 0.9);

        let trend = TemporalPattern::Trend {
            direction: TrendDirection::Increasing,
            slope: 0.5,
            r_squared: 0.85,
            rate: 0.5,
        };
        assert_eq!(trend.strength(), 0.85);
        assert_eq!(trend.pattern_type(), PatternType::Trend);

        let cyclic = TemporalPattern::Cyclic {
            cycles: vec![],
            regularity: 0.7,
            variability: 0.42,
        };
        assert_eq!(cyclic.strength(), 0.7);
    }

    #[test]
    fn test_tagged_serialization() {
        let pattern = periodic(0.8);
        let json = serde_json::to_value(&pattern).expect("serialize");
        assert_eq!(json["type"], "periodic");
        assert_eq!(json["period"], 10.0);

        let back: TemporalPattern = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, pattern);
    }

    #[test]
    fn test_analysis_round_trip_preserves_fields() {
        let mut summary = HashMap::new();
        summary.insert(
            PatternType::Periodic,
            TypeSummary {
                count: 1,
                average_strength: 0.8,
                max_strength: 0.8,
            },
        );
        let analysis = PatternAnalysis {
            id: "pat_0011223344556677".to_string(),
            timestamp: Utc::now(),
            data_points: 100,
            patterns: vec![periodic(0.8)],
            summary,
            dominant_pattern: Some(periodic(0.8)),
            confidence: 0.65,
        };

        let json = serde_json::to_string(&analysis).expect("serialize");
        let back: PatternAnalysis = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.id, analysis.id);
        assert_eq!(back.patterns, analysis.patterns);
        assert_eq!(back.dominant_pattern, analysis.dominant_pattern);
        assert!((back.confidence - analysis.confidence).abs() < f64::EPSILON);
    }

    #[test]
    fn test_dominant_strength_defaults_to_zero() {
        let analysis = PatternAnalysis {
            id: "pat_0000000000000000".to_string(),
            timestamp: Utc::now(),
            data_points: 0,
            patterns: vec![],
            summary: HashMap::new(),
            dominant_pattern: None,
            confidence: 0.0,
        };
        assert_eq!(analysis.dominant_strength(), 0.0);
    }
}
