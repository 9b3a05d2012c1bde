//! Anomaly records and severity classification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Detection strategy.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyMethod {
    Statistical,
    IsolationForest,
    Lof,
    VsmBased,
}

/// Severity of an anomaly, ordered from none to critical.
#[derive(
    Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    None,
    Low,
    Medium,
    High,
    Critical,
}

/// Variety-model violation raised by the vsm_based method.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VarietyViolation {
    /// Variety ratio below 0.5.
    InsufficientVariety,
    /// Variety ratio above 2.0.
    ExcessiveVariety,
    /// Value magnitude far from the expected recursion depth.
    RecursionBreakdown,
    /// Value magnitude beyond the algedonic threshold.
    AlgedonicAlert,
}

/// A single classified anomalous sample.
///
/// Tagged variant per detection method; common fields are index, value, and
/// severity.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnomalyRecord {
    Statistical {
        index: usize,
        value: f64,
        severity: Severity,
        /// Z-score against the baseline.
        z_score: f64,
        /// Absolute deviation from the baseline mean.
        deviation: f64,
    },
    Isolation {
        index: usize,
        value: f64,
        severity: Severity,
        /// Isolation score in (0, 1].
        score: f64,
    },
    Lof {
        index: usize,
        value: f64,
        severity: Severity,
        /// Local outlier factor (>= 0).
        score: f64,
    },
    Vsm {
        index: usize,
        value: f64,
        severity: Severity,
        /// Variety of the value.
        variety: f64,
        /// Variety relative to the baseline expectation.
        variety_ratio: f64,
        violation: VarietyViolation,
    },
}

impl AnomalyRecord {
    pub fn index(&self) -> usize {
        match self {
            Self::Statistical { index, .. }
            | Self::Isolation { index, .. }
            | Self::Lof { index, .. }
            | Self::Vsm { index, .. } => *index,
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            Self::Statistical { value, .. }
            | Self::Isolation { value, .. }
            | Self::Lof { value, .. }
            | Self::Vsm { value, .. } => *value,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::Statistical { severity, .. }
            | Self::Isolation { severity, .. }
            | Self::Lof { severity, .. }
            | Self::Vsm { severity, .. } => *severity,
        }
    }

    /// The variety violation, when this record came from the vsm method.
    pub fn violation(&self) -> Option<VarietyViolation> {
        match self {
            Self::Vsm { violation, .. } => Some(*violation),
            _ => None,
        }
    }
}

/// Result of one anomaly detection call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnomalyReport {
    /// Minted `anom_` identifier.
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub method: AnomalyMethod,
    /// Length of the analyzed data.
    pub data_points: usize,
    pub anomaly_detected: bool,
    pub anomaly_count: usize,
    pub anomalies: Vec<AnomalyRecord>,
    /// Highest individual severity; `None` when nothing was flagged.
    pub severity: Severity,
    /// True when any individual record is critical.
    pub critical: bool,
    /// Human-readable description of the finding.
    pub description: String,
    pub recommendations: Vec<String>,
}
