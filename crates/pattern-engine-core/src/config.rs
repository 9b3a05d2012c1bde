//! Engine configuration.
//!
//! [`EngineConfig`] is the recognized option surface for the coordinator;
//! every field has a documented default encoded in `Default`. Fixed numeric
//! parameters that are not configurable live in [`constants`].

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Fixed numeric parameters shared across detectors.
pub mod constants {
    /// Default analysis window length in samples.
    pub const DEFAULT_WINDOW_SIZE: usize = 100;

    /// Default slide between consecutive windows.
    pub const DEFAULT_SLIDE_INTERVAL: usize = 10;

    /// Isolation forest ensemble size.
    pub const ISOLATION_TREES: usize = 100;

    /// Isolation forest subsample cap.
    pub const ISOLATION_SUBSAMPLE: usize = 256;

    /// Isolation tree depth limit.
    pub const ISOLATION_MAX_DEPTH: usize = 10;

    /// Retained anomaly history length in the engine state.
    pub const MAX_RETAINED_ANOMALIES: usize = 100;

    /// Retained pattern history length in the engine state.
    pub const MAX_RETAINED_PATTERNS: usize = 1000;

    /// Deadline for batch anomaly fan-out, in milliseconds.
    pub const BATCH_DEADLINE_MS: u64 = 5000;

    /// Granger acceptance threshold for a directed causal link.
    pub const GRANGER_F_THRESHOLD: f64 = 3.0;

    /// Minimum series length for causal screening.
    pub const GRANGER_MIN_SAMPLES: usize = 20;
}

/// Variety management strategy for the viability model.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VarietyManagement {
    /// Maintain requisite variety: system variety must match environment
    /// variety (ratio >= 1).
    #[default]
    Requisite,
    /// Attenuate environmental variety before it reaches the system.
    Attenuation,
    /// Amplify system variety toward the environment.
    Amplification,
}

/// Vector-store adapter configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    /// Base URL of the vector store.
    pub url: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Optional bearer token.
    pub api_key: Option<String>,
    /// Identifier of the feature encoder model.
    pub encoder_model: String,
    /// Dimensionality of stored vectors.
    pub vector_dimensions: usize,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8000".to_string(),
            timeout_ms: 5000,
            api_key: None,
            encoder_model: "feature-hash-v1".to_string(),
            vector_dimensions: 384,
        }
    }
}

/// Recognized engine options.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Scheduler tick interval in milliseconds.
    pub detection_interval_ms: u64,

    /// Isolation score above which an anomaly is classified high severity.
    pub anomaly_threshold: f64,

    /// Minimum |r| for a pair to be kept as a relationship.
    pub correlation_threshold: f64,

    /// Nested control tiers of the viability model.
    pub recursion_levels: u32,

    /// Variety management strategy.
    pub variety_management: VarietyManagement,

    /// Enable the scheduler's autonomous detection loop.
    pub feedback_loops: bool,

    /// Enable algedonic signalling on critical anomalies.
    pub algedonic_signals: bool,

    /// Vector-store adapter settings.
    pub vector_store: VectorStoreConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            detection_interval_ms: 5000,
            anomaly_threshold: 0.8,
            correlation_threshold: 0.7,
            recursion_levels: 5,
            variety_management: VarietyManagement::Requisite,
            feedback_loops: true,
            algedonic_signals: true,
            vector_store: VectorStoreConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Validate ranges before handing the config to the coordinator.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.detection_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "detection_interval_ms",
                reason: "must be positive".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.anomaly_threshold) {
            return Err(ConfigError::InvalidValue {
                field: "anomaly_threshold",
                reason: format!("{} outside [0, 1]", self.anomaly_threshold),
            });
        }
        if !(0.0..=1.0).contains(&self.correlation_threshold) {
            return Err(ConfigError::InvalidValue {
                field: "correlation_threshold",
                reason: format!("{} outside [0, 1]", self.correlation_threshold),
            });
        }
        if self.recursion_levels == 0 {
            return Err(ConfigError::InvalidValue {
                field: "recursion_levels",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.vector_store.vector_dimensions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "vector_store.vector_dimensions",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}
