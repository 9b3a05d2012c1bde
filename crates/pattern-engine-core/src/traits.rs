//! Core traits at the engine's external seams.
//!
//! [`VectorStore`] is the persistence boundary: the engine calls it
//! best-effort and never lets a transport failure abort an analysis.
//! [`TelemetrySink`] is the observability boundary: emission is
//! fire-and-forget. Both are object-safe so the coordinator holds them as
//! `Arc<dyn ...>`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::types::document::{SearchMatch, VectorDocument};

/// Health verdict from the store.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreHealth {
    /// Raw status string, `"healthy"` when everything is fine.
    pub status: String,
}

impl StoreHealth {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Persistence contract for analysis artifacts.
///
/// All operations return typed errors; timeouts never panic. Implementations
/// must be thread-safe: the coordinator shares one instance across its serial
/// loop and the scheduler tick.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Persist a pattern analysis document.
    async fn store_pattern(&self, document: VectorDocument) -> StoreResult<()>;

    /// Persist an anomaly report document.
    async fn store_anomaly(&self, document: VectorDocument) -> StoreResult<()>;

    /// Persist a correlation analysis document.
    async fn store_correlation(&self, document: VectorDocument) -> StoreResult<()>;

    /// Fetch the most recent raw samples for the scheduler pipeline.
    async fn get_recent_data(&self, limit: usize) -> StoreResult<Vec<f64>>;

    /// Nearest-neighbor search over stored pattern documents.
    async fn search_similar_patterns(
        &self,
        vector: Vec<f32>,
        k: usize,
    ) -> StoreResult<Vec<SearchMatch>>;

    /// Probe the store's health endpoint.
    async fn health_check(&self) -> StoreResult<StoreHealth>;
}

/// Telemetry event emitted by the engine under the `pattern_engine` namespace.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// A temporal analysis completed.
    PatternAnalyzed {
        pattern_count: usize,
        duration_ms: u64,
    },
    /// An anomaly detection completed with findings.
    AnomalyDetected { anomaly_count: usize, critical: bool },
    /// Out-of-band algedonic path; bypasses ordinary filtering.
    CriticalAnomaly {
        report_id: String,
        description: String,
    },
    /// Viability-model reading.
    Vsm {
        variety_ratio: f64,
        viability_score: f64,
    },
    /// Vector-store interaction summary.
    VectorStore {
        operations: u64,
        query_duration_ms: u64,
        connected: bool,
    },
    /// Process memory reading.
    SystemMemory { bytes: u64 },
}

/// Fire-and-forget sink for engine telemetry.
///
/// Emission must never fail the caller; sinks swallow their own errors.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    /// Emit one event. Critical-anomaly events must pass through even when a
    /// sink filters ordinary traffic.
    async fn emit(&self, event: TelemetryEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_verdict() {
        assert!(StoreHealth {
            status: "healthy".to_string()
        }
        .is_healthy());
        assert!(!StoreHealth {
            status: "degraded".to_string()
        }
        .is_healthy());
    }

    #[test]
    fn test_event_serialization() {
        let event = TelemetryEvent::Vsm {
            variety_ratio: 1.5,
            viability_score: 5.0 / 6.0,
        };
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["event"], "vsm");
        assert_eq!(json["variety_ratio"], 1.5);
    }

    #[test]
    fn test_critical_event_carries_report_id() {
        let event = TelemetryEvent::CriticalAnomaly {
            report_id: "anom_ffeeddccbbaa9988".to_string(),
            description: "algedonic alert at index 3".to_string(),
        };
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["event"], "critical_anomaly");
        assert!(json["report_id"].as_str().unwrap().starts_with("anom_"));
    }
}
