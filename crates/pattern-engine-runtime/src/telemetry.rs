//! Telemetry sinks.
//!
//! [`TracingTelemetry`] forwards events into the tracing pipeline under the
//! `pattern_engine` namespace. Critical-anomaly events log at error level so
//! they bypass ordinary filtering. [`RecordingTelemetry`] captures events
//! for assertions in tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{error, info};

use pattern_engine_core::traits::{TelemetryEvent, TelemetrySink};

/// Production sink: events become structured tracing records.
#[derive(Clone, Debug, Default)]
pub struct TracingTelemetry;

#[async_trait]
impl TelemetrySink for TracingTelemetry {
    async fn emit(&self, event: TelemetryEvent) {
        match &event {
            TelemetryEvent::CriticalAnomaly {
                report_id,
                description,
            } => {
                // algedonic path: always at error level
                error!(
                    target: "pattern_engine::telemetry",
                    report_id = %report_id,
                    description = %description,
                    "critical_anomaly"
                );
            }
            TelemetryEvent::PatternAnalyzed {
                pattern_count,
                duration_ms,
            } => {
                info!(
                    target: "pattern_engine::telemetry",
                    pattern_count, duration_ms, "pattern_analyzed"
                );
            }
            TelemetryEvent::AnomalyDetected {
                anomaly_count,
                critical,
            } => {
                info!(
                    target: "pattern_engine::telemetry",
                    anomaly_count, critical, "anomaly_detected"
                );
            }
            TelemetryEvent::Vsm {
                variety_ratio,
                viability_score,
            } => {
                info!(
                    target: "pattern_engine::telemetry",
                    variety_ratio, viability_score, "vsm"
                );
            }
            TelemetryEvent::VectorStore {
                operations,
                query_duration_ms,
                connected,
            } => {
                info!(
                    target: "pattern_engine::telemetry",
                    operations, query_duration_ms, connected, "vector_store"
                );
            }
            TelemetryEvent::SystemMemory { bytes } => {
                info!(target: "pattern_engine::telemetry", bytes, "system_memory");
            }
        }
    }
}

/// Test sink: stores every emitted event in order.
#[derive(Debug, Default)]
pub struct RecordingTelemetry {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl RecordingTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events.lock().clone()
    }

    /// Count of critical-anomaly events.
    pub fn critical_count(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, TelemetryEvent::CriticalAnomaly { .. }))
            .count()
    }
}

#[async_trait]
impl TelemetrySink for RecordingTelemetry {
    async fn emit(&self, event: TelemetryEvent) {
        self.events.lock().push(event);
    }
}
