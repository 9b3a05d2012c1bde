//! Domain types for the pattern engine.
//!
//! Records produced by the detectors are immutable values: the temporal
//! detector emits [`PatternAnalysis`], the correlation analyzer emits
//! [`CorrelationAnalysis`], and the anomaly detector emits [`AnomalyReport`].
//! The viability model state lives in [`VsmState`]; vector-store wire shapes
//! live in [`document`].

pub mod anomaly;
pub mod correlation;
pub mod document;
pub mod pattern;
pub mod vsm;

pub use anomaly::{AnomalyMethod, AnomalyRecord, AnomalyReport, Severity, VarietyViolation};
pub use correlation::{
    CausalAnalysis, CausalGraph, CausalLink, CausalSkip, CorrelationAnalysis, CorrelationMatrix,
    CorrelationMethod, Direction, NetworkMetrics, Relationship,
};
pub use document::{DocumentKind, SearchMatch, VectorDocument};
pub use pattern::{
    BurstInstance, CycleSpan, PatternAnalysis, PatternType, TemporalPattern, TrendDirection,
    TypeSummary,
};
pub use vsm::{AlgedonicChannel, EnvironmentState, LevelState, Viability, VsmState};
