//! The engine coordinator.
//!
//! A single serial actor owns all mutable engine state. Clients hold an
//! [`EngineHandle`] and exchange typed request/response messages over an
//! mpsc channel; the scheduler tick runs inside the same loop, so every
//! operation is atomic with respect to state and tick results are ordered
//! after in-flight client calls.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant as StdInstant};

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use pattern_engine_core::anomaly::{AnomalyDetector, AnomalyOptions};
use pattern_engine_core::config::constants::{
    DEFAULT_WINDOW_SIZE, MAX_RETAINED_ANOMALIES, MAX_RETAINED_PATTERNS,
};
use pattern_engine_core::correlation::{CorrelationAnalyzer, CorrelationOptions, SignalInput};
use pattern_engine_core::error::{EngineError, EngineResult, StoreError};
use pattern_engine_core::temporal::{TemporalDetector, TemporalOptions};
use pattern_engine_core::traits::{StoreHealth, TelemetryEvent, TelemetrySink, VectorStore};
use pattern_engine_core::types::{
    AnomalyReport, CorrelationAnalysis, PatternAnalysis, Viability, VsmState,
};
use pattern_engine_core::EngineConfig;
use pattern_engine_storage::{
    anomaly_document, correlation_document, pattern_document, HashingEncoder,
};

/// Command channel depth; senders briefly backpressure beyond this.
const COMMAND_BUFFER: usize = 64;

/// Rough per-record byte estimates for the memory telemetry reading.
const PATTERN_RECORD_BYTES: usize = 640;
const ANOMALY_RECORD_BYTES: usize = 320;
const CORRELATION_RECORD_BYTES: usize = 768;

/// Snapshot of the engine state returned by `get_system_state`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SystemState {
    pub vsm_state: VsmState,
    pub patterns_analyzed: u64,
    pub anomalies_detected: u64,
    pub correlations_found: u64,
    pub pattern_count: usize,
    pub anomaly_count: usize,
    pub correlation_count: usize,
    pub variety_ratio: f64,
    pub viability_score: f64,
}

enum EngineCommand {
    AnalyzePattern {
        data: Vec<f64>,
        options: Option<TemporalOptions>,
        reply: oneshot::Sender<PatternAnalysis>,
    },
    DetectAnomaly {
        data: Vec<f64>,
        baseline: Option<Vec<f64>>,
        options: Option<AnomalyOptions>,
        reply: oneshot::Sender<(AnomalyReport, Viability)>,
    },
    CorrelatePatterns {
        inputs: Vec<SignalInput>,
        options: Option<CorrelationOptions>,
        reply: oneshot::Sender<CorrelationAnalysis>,
    },
    GetSystemState {
        reply: oneshot::Sender<SystemState>,
    },
    HealthCheck {
        reply: oneshot::Sender<Result<StoreHealth, StoreError>>,
    },
    Shutdown,
}

/// Client handle to the coordinator; cheap to clone.
///
/// Calls from a single client are serialized by the actor loop; every call
/// is atomic with respect to engine state.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    async fn request<T>(
        &self,
        command: EngineCommand,
        reply: oneshot::Receiver<T>,
    ) -> EngineResult<T> {
        self.tx
            .send(command)
            .await
            .map_err(|_| EngineError::internal("engine loop has stopped"))?;
        reply
            .await
            .map_err(|_| EngineError::internal("engine loop dropped the reply"))
    }

    /// Run temporal detection and retain the result.
    pub async fn analyze_pattern(
        &self,
        data: Vec<f64>,
        options: Option<TemporalOptions>,
    ) -> EngineResult<PatternAnalysis> {
        let (reply, rx) = oneshot::channel();
        self.request(
            EngineCommand::AnalyzePattern {
                data,
                options,
                reply,
            },
            rx,
        )
        .await
    }

    /// Run anomaly detection; the baseline defaults to the current
    /// viability-model state.
    pub async fn detect_anomaly(
        &self,
        data: Vec<f64>,
        baseline: Option<Vec<f64>>,
        options: Option<AnomalyOptions>,
    ) -> EngineResult<(AnomalyReport, Viability)> {
        let (reply, rx) = oneshot::channel();
        self.request(
            EngineCommand::DetectAnomaly {
                data,
                baseline,
                options,
                reply,
            },
            rx,
        )
        .await
    }

    /// Correlate a set of inputs and retain the result when significant.
    pub async fn correlate_patterns(
        &self,
        inputs: Vec<SignalInput>,
        options: Option<CorrelationOptions>,
    ) -> EngineResult<CorrelationAnalysis> {
        let (reply, rx) = oneshot::channel();
        self.request(
            EngineCommand::CorrelatePatterns {
                inputs,
                options,
                reply,
            },
            rx,
        )
        .await
    }

    /// Snapshot the engine state.
    pub async fn get_system_state(&self) -> EngineResult<SystemState> {
        let (reply, rx) = oneshot::channel();
        self.request(EngineCommand::GetSystemState { reply }, rx).await
    }

    /// Probe the vector store through the engine.
    pub async fn health_check(&self) -> EngineResult<StoreHealth> {
        let (reply, rx) = oneshot::channel();
        let result = self.request(EngineCommand::HealthCheck { reply }, rx).await?;
        result.map_err(EngineError::from)
    }

    /// Stop the coordinator loop.
    pub async fn shutdown(&self) {
        let _ = self.tx.send(EngineCommand::Shutdown).await;
    }
}

struct Counters {
    patterns_analyzed: u64,
    anomalies_detected: u64,
    correlations_found: u64,
}

/// The coordinator actor. Constructed via [`PatternEngine::spawn`].
pub struct PatternEngine {
    config: EngineConfig,
    store: Arc<dyn VectorStore>,
    telemetry: Arc<dyn TelemetrySink>,
    encoder: HashingEncoder,

    vsm: VsmState,
    patterns: HashMap<String, PatternAnalysis>,
    pattern_order: VecDeque<String>,
    anomalies: VecDeque<AnomalyReport>,
    correlations: HashMap<String, CorrelationAnalysis>,
    correlation_order: VecDeque<String>,
    counters: Counters,
    store_operations: u64,
}

impl PatternEngine {
    /// Validate the configuration and start the coordinator loop.
    pub fn spawn(
        config: EngineConfig,
        store: Arc<dyn VectorStore>,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> EngineResult<EngineHandle> {
        config.validate()?;
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);

        let engine = PatternEngine {
            encoder: HashingEncoder::new(config.vector_store.vector_dimensions),
            config,
            store,
            telemetry,
            vsm: VsmState::default(),
            patterns: HashMap::new(),
            pattern_order: VecDeque::new(),
            anomalies: VecDeque::new(),
            correlations: HashMap::new(),
            correlation_order: VecDeque::new(),
            counters: Counters {
                patterns_analyzed: 0,
                anomalies_detected: 0,
                correlations_found: 0,
            },
            store_operations: 0,
        };
        tokio::spawn(engine.run(rx));
        Ok(EngineHandle { tx })
    }

    async fn run(mut self, mut rx: mpsc::Receiver<EngineCommand>) {
        let period = Duration::from_millis(self.config.detection_interval_ms);
        let mut tick = interval_at(Instant::now() + period, period);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            interval_ms = self.config.detection_interval_ms,
            feedback_loops = self.config.feedback_loops,
            "engine loop started"
        );

        loop {
            tokio::select! {
                command = rx.recv() => {
                    match command {
                        Some(EngineCommand::Shutdown) | None => {
                            info!("engine loop stopping");
                            break;
                        }
                        Some(command) => self.handle(command).await,
                    }
                }
                _ = tick.tick(), if self.config.feedback_loops => {
                    // fire-and-forget: a failed tick never skips future ones
                    self.run_tick().await;
                }
            }
        }
    }

    async fn handle(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::AnalyzePattern {
                data,
                options,
                reply,
            } => {
                let analysis = self.analyze_pattern(&data, options).await;
                let _ = reply.send(analysis);
            }
            EngineCommand::DetectAnomaly {
                data,
                baseline,
                options,
                reply,
            } => {
                let result = self.detect_anomaly(&data, baseline, options).await;
                let _ = reply.send(result);
            }
            EngineCommand::CorrelatePatterns {
                inputs,
                options,
                reply,
            } => {
                let analysis = self.correlate_patterns(&inputs, options).await;
                let _ = reply.send(analysis);
            }
            EngineCommand::GetSystemState { reply } => {
                let _ = reply.send(self.snapshot());
            }
            EngineCommand::HealthCheck { reply } => {
                let started = StdInstant::now();
                let result = self.store.health_check().await;
                self.note_store_operation(started, result.is_ok()).await;
                let _ = reply.send(result);
            }
            // shutdown is intercepted by the loop before dispatch
            EngineCommand::Shutdown => {}
        }
    }

    // ========================================================================
    // OPERATIONS
    // ========================================================================

    async fn analyze_pattern(
        &mut self,
        data: &[f64],
        options: Option<TemporalOptions>,
    ) -> PatternAnalysis {
        let started = StdInstant::now();
        let detector = TemporalDetector::with_options(options.unwrap_or_default());
        let analysis = detector.analyze(data);

        self.counters.patterns_analyzed += 1;
        self.telemetry
            .emit(TelemetryEvent::PatternAnalyzed {
                pattern_count: analysis.patterns.len(),
                duration_ms: started.elapsed().as_millis() as u64,
            })
            .await;

        self.persist_pattern(&analysis).await;
        self.retain_pattern(analysis.clone());
        analysis
    }

    async fn detect_anomaly(
        &mut self,
        data: &[f64],
        baseline: Option<Vec<f64>>,
        options: Option<AnomalyOptions>,
    ) -> (AnomalyReport, Viability) {
        let options = options.unwrap_or_else(|| AnomalyOptions {
            high_isolation_score: self.config.anomaly_threshold,
            recursion_depth: self.config.recursion_levels,
            ..Default::default()
        });
        // the viability-model state stands in when no baseline accompanies
        // the call
        let baseline = baseline.unwrap_or_else(|| self.vsm.level_varieties());

        let detector = AnomalyDetector::with_options(options);
        let report = detector.detect(data, &baseline);

        let variety_ratio = self.vsm.variety_ratio();
        let viability = Viability {
            viable: variety_ratio >= 1.0 && !report.critical,
            variety_ratio,
            recommendations: report.recommendations.clone(),
        };

        if report.critical && self.config.algedonic_signals {
            self.vsm.algedonic_channel.raise(report.description.clone());
            // out-of-band path: exactly one event per critical report
            self.telemetry
                .emit(TelemetryEvent::CriticalAnomaly {
                    report_id: report.id.clone(),
                    description: report.description.clone(),
                })
                .await;
        }
        if report.anomaly_detected {
            self.counters.anomalies_detected += report.anomaly_count as u64;
            self.telemetry
                .emit(TelemetryEvent::AnomalyDetected {
                    anomaly_count: report.anomaly_count,
                    critical: report.critical,
                })
                .await;
            self.persist_anomaly(&report).await;
            self.anomalies.push_back(report.clone());
            while self.anomalies.len() > MAX_RETAINED_ANOMALIES {
                self.anomalies.pop_front();
            }
        }
        self.telemetry
            .emit(TelemetryEvent::Vsm {
                variety_ratio,
                viability_score: self.viability_score(),
            })
            .await;

        (report, viability)
    }

    async fn correlate_patterns(
        &mut self,
        inputs: &[SignalInput],
        options: Option<CorrelationOptions>,
    ) -> CorrelationAnalysis {
        let options = options.unwrap_or_else(|| CorrelationOptions {
            threshold: self.config.correlation_threshold,
            ..Default::default()
        });
        let analysis = CorrelationAnalyzer::with_options(options).analyze(inputs);

        self.counters.correlations_found += analysis.relationships.len() as u64;
        if analysis.is_significant() {
            self.persist_correlation(&analysis).await;
            self.correlation_order.push_back(analysis.id.clone());
            self.correlations
                .insert(analysis.id.clone(), analysis.clone());
            while self.correlation_order.len() > MAX_RETAINED_PATTERNS {
                if let Some(evicted) = self.correlation_order.pop_front() {
                    self.correlations.remove(&evicted);
                }
            }
        }
        analysis
    }

    fn snapshot(&self) -> SystemState {
        SystemState {
            vsm_state: self.vsm.clone(),
            patterns_analyzed: self.counters.patterns_analyzed,
            anomalies_detected: self.counters.anomalies_detected,
            correlations_found: self.counters.correlations_found,
            pattern_count: self.patterns.len(),
            anomaly_count: self.anomalies.len(),
            correlation_count: self.correlations.len(),
            variety_ratio: self.vsm.variety_ratio(),
            viability_score: self.viability_score(),
        }
    }

    /// Blend of variety sufficiency, anomaly pressure, and pattern richness.
    fn viability_score(&self) -> f64 {
        let anomaly_pressure = 1.0 - self.anomalies.len() as f64 / MAX_RETAINED_ANOMALIES as f64;
        let pattern_richness = (self.patterns.len() as f64 / 50.0).min(1.0);
        (self.vsm.variety_ratio() + anomaly_pressure + pattern_richness) / 3.0
    }

    // ========================================================================
    // SCHEDULER TICK
    // ========================================================================

    async fn run_tick(&mut self) {
        let started = StdInstant::now();
        match self.store.get_recent_data(DEFAULT_WINDOW_SIZE).await {
            Ok(data) if !data.is_empty() => {
                self.note_store_operation(started, true).await;
                debug!(samples = data.len(), "scheduler tick");
                self.analyze_pattern(&data, None).await;
                self.detect_anomaly(&data, None, None).await;
            }
            Ok(_) => {
                self.note_store_operation(started, true).await;
                debug!("scheduler tick found no recent data");
            }
            Err(e) => {
                self.note_store_operation(started, false).await;
                warn!(error = %e, "scheduler tick failed");
            }
        }

        self.telemetry
            .emit(TelemetryEvent::SystemMemory {
                bytes: self.estimated_state_bytes(),
            })
            .await;
    }

    /// Approximate resident size of the retained analysis results.
    fn estimated_state_bytes(&self) -> u64 {
        (self.patterns.len() * PATTERN_RECORD_BYTES
            + self.anomalies.len() * ANOMALY_RECORD_BYTES
            + self.correlations.len() * CORRELATION_RECORD_BYTES) as u64
    }

    // ========================================================================
    // RETENTION AND PERSISTENCE
    // ========================================================================

    fn retain_pattern(&mut self, analysis: PatternAnalysis) {
        self.pattern_order.push_back(analysis.id.clone());
        self.patterns.insert(analysis.id.clone(), analysis);
        while self.pattern_order.len() > MAX_RETAINED_PATTERNS {
            if let Some(evicted) = self.pattern_order.pop_front() {
                self.patterns.remove(&evicted);
            }
        }
    }

    async fn persist_pattern(&mut self, analysis: &PatternAnalysis) {
        let document = pattern_document(analysis, &self.encoder);
        let started = StdInstant::now();
        let result = self.store.store_pattern(document).await;
        self.log_persist("pattern", &analysis.id, started, result).await;
    }

    async fn persist_anomaly(&mut self, report: &AnomalyReport) {
        let document = anomaly_document(report, &self.encoder);
        let started = StdInstant::now();
        let result = self.store.store_anomaly(document).await;
        self.log_persist("anomaly", &report.id, started, result).await;
    }

    async fn persist_correlation(&mut self, analysis: &CorrelationAnalysis) {
        let document = correlation_document(analysis, &self.encoder);
        let started = StdInstant::now();
        let result = self.store.store_correlation(document).await;
        self.log_persist("correlation", &analysis.id, started, result).await;
    }

    /// Persistence is best-effort: failures are logged and telemetered, the
    /// in-memory result is preserved, and nothing propagates to the caller.
    async fn log_persist(
        &mut self,
        kind: &str,
        id: &str,
        started: StdInstant,
        result: Result<(), StoreError>,
    ) {
        match result {
            Ok(()) => {
                self.note_store_operation(started, true).await;
            }
            Err(e) => {
                error!(kind, id, error = %e, "persist failed, keeping in-memory result");
                self.note_store_operation(started, false).await;
            }
        }
    }

    async fn note_store_operation(&mut self, started: StdInstant, connected: bool) {
        self.store_operations += 1;
        self.telemetry
            .emit(TelemetryEvent::VectorStore {
                operations: self.store_operations,
                query_duration_ms: started.elapsed().as_millis() as u64,
                connected,
            })
            .await;
    }
}
