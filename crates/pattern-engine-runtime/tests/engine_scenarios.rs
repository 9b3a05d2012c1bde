//! End-to-end scenarios through the full coordinator.

use std::f64::consts::TAU;
use std::sync::Arc;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use pattern_engine_core::anomaly::AnomalyOptions;
use pattern_engine_core::correlation::{CorrelationOptions, SignalInput};
use pattern_engine_core::stubs::InMemoryVectorStore;
use pattern_engine_core::traits::{TelemetrySink, VectorStore};
use pattern_engine_core::types::{
    AnomalyMethod, Direction, DocumentKind, PatternType, Severity, VarietyViolation,
};
use pattern_engine_core::EngineConfig;
use pattern_engine_runtime::{EngineHandle, PatternEngine, RecordingTelemetry};

fn spawn(
    config: EngineConfig,
) -> (EngineHandle, Arc<InMemoryVectorStore>, Arc<RecordingTelemetry>) {
    let store = Arc::new(InMemoryVectorStore::new());
    let telemetry = Arc::new(RecordingTelemetry::new());
    let handle = PatternEngine::spawn(
        config,
        store.clone() as Arc<dyn VectorStore>,
        telemetry.clone() as Arc<dyn TelemetrySink>,
    )
    .expect("spawn engine");
    (handle, store, telemetry)
}

fn quiet() -> EngineConfig {
    EngineConfig {
        feedback_loops: false,
        ..Default::default()
    }
}

/// ~N(mean, std^2) samples from a seeded generator.
fn gaussian(n: usize, mean: f64, std: f64, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let unit: f64 = (0..12).map(|_| rng.gen_range(0.0..1.0)).sum::<f64>() - 6.0;
            mean + std * unit
        })
        .collect()
}

#[tokio::test]
async fn scenario_periodic_detection() {
    let (handle, store, _) = spawn(quiet());

    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let data: Vec<f64> = (0..100)
        .map(|i| (TAU * i as f64 / 10.0).sin() + 0.1 * rng.gen_range(-1.0..1.0))
        .collect();
    let analysis = handle.analyze_pattern(data, None).await.expect("analysis");

    let dominant = analysis.dominant_pattern.as_ref().expect("dominant");
    assert_eq!(dominant.pattern_type(), PatternType::Periodic);
    match dominant {
        pattern_engine_core::types::TemporalPattern::Periodic {
            period, strength, ..
        } => {
            assert!((period - 10.0).abs() <= 1.0, "period {period}");
            assert!(*strength > 0.7, "strength {strength}");
        }
        other => panic!("expected periodic, got {other:?}"),
    }

    // persisted through the store adapter
    assert_eq!(store.count(DocumentKind::Pattern), 1);
    handle.shutdown().await;
}

#[tokio::test]
async fn scenario_statistical_anomaly() {
    let (handle, store, _) = spawn(quiet());

    let baseline = gaussian(100, 10.0, 2.0, 2);
    let data = vec![10.0, 11.0, 9.0, 50.0, 10.0, 11.0];
    let (report, viability) = handle
        .detect_anomaly(data, Some(baseline), None)
        .await
        .expect("detect");

    assert!(report.anomaly_detected);
    assert_eq!(report.anomaly_count, 1);
    assert!(matches!(report.severity, Severity::High | Severity::Medium));
    assert!(report.description.contains("index 3"));
    assert!(viability.viable, "no critical finding, ratio 1.5");
    assert_eq!(store.count(DocumentKind::Anomaly), 1);
    handle.shutdown().await;
}

#[tokio::test]
async fn scenario_correlation_pair() {
    let (handle, store, _) = spawn(quiet());

    let p1 = gaussian(50, 0.0, 1.0, 3);
    let p2: Vec<f64> = p1.iter().map(|v| 2.0 * v + 1.0).collect();
    let p3 = gaussian(50, 0.0, 1.0, 77);

    let analysis = handle
        .correlate_patterns(
            vec![
                SignalInput::RawData(p1),
                SignalInput::RawData(p2),
                SignalInput::RawData(p3),
            ],
            None,
        )
        .await
        .expect("correlate");

    assert!(analysis.matrix.get(0, 1) > 0.99);
    let strongest = analysis.strongest.as_ref().expect("strongest");
    assert_eq!((strongest.source, strongest.target), (0, 1));
    assert_eq!(strongest.direction, Direction::Positive);
    assert!(!analysis
        .relationships
        .iter()
        .any(|r| r.target == 2 || r.source == 2));

    // significant, so persisted and retained
    assert_eq!(store.count(DocumentKind::Correlation), 1);
    handle.shutdown().await;
}

#[tokio::test]
async fn scenario_critical_algedonic() {
    let (handle, _, telemetry) = spawn(quiet());

    let baseline = gaussian(100, 10.0, 2.0, 4);
    // beyond mean + 4*std of the baseline magnitudes
    let (report, viability) = handle
        .detect_anomaly(
            vec![10.0, 50.0],
            Some(baseline),
            Some(AnomalyOptions::with_method(AnomalyMethod::VsmBased)),
        )
        .await
        .expect("detect");

    assert!(report.critical);
    assert_eq!(report.severity, Severity::Critical);
    let flagged = report
        .anomalies
        .iter()
        .find(|a| a.index() == 1)
        .expect("flagged index 1");
    assert_eq!(flagged.violation(), Some(VarietyViolation::AlgedonicAlert));
    assert!(!viability.viable);

    // algedonic channel active after the call, critical event exactly once
    let state = handle.get_system_state().await.expect("state");
    assert!(state.vsm_state.algedonic_channel.active);
    assert!(state.vsm_state.algedonic_channel.last_signal.is_some());
    assert_eq!(telemetry.critical_count(), 1);
    handle.shutdown().await;
}

#[tokio::test]
async fn scenario_variety_ratio_and_viability_score() {
    let (handle, _, _) = spawn(quiet());

    let state = handle.get_system_state().await.expect("state");
    // (100+80+60+40+20) / 200
    assert!((state.variety_ratio - 1.5).abs() < f64::EPSILON);
    // (1.5 + 1.0 + 0.0) / 3
    assert!((state.viability_score - 5.0 / 6.0).abs() < f64::EPSILON);
    handle.shutdown().await;
}

#[tokio::test]
async fn scenario_causal_link_at_lag_two() {
    let (handle, _, _) = spawn(quiet());

    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut level = 0.0;
    let a: Vec<f64> = (0..60)
        .map(|_| {
            level += rng.gen_range(-1.0..1.0);
            level
        })
        .collect();
    let b: Vec<f64> = (0..60)
        .map(|i| {
            let base = if i >= 2 { a[i - 2] } else { 0.0 };
            base + rng.gen_range(-0.05..0.05)
        })
        .collect();

    let analysis = handle
        .correlate_patterns(
            vec![SignalInput::RawData(a), SignalInput::RawData(b)],
            Some(CorrelationOptions {
                analyze_causality: true,
                ..Default::default()
            }),
        )
        .await
        .expect("correlate");

    let causal = analysis.causal.as_ref().expect("causal analysis");
    let link = causal
        .links
        .iter()
        .find(|l| l.source == 0 && l.target == 1)
        .expect("link a -> b");
    assert_eq!(link.optimal_lag, 2);
    assert!(link.f_statistic > 3.0);
    handle.shutdown().await;
}

#[tokio::test]
async fn scheduler_tick_runs_pipeline() {
    let store = Arc::new(InMemoryVectorStore::new());
    let telemetry = Arc::new(RecordingTelemetry::new());
    store.set_recent_data(
        (0..100)
            .map(|i| (TAU * i as f64 / 10.0).sin() * 10.0 + 20.0)
            .collect(),
    );

    let handle = PatternEngine::spawn(
        EngineConfig {
            detection_interval_ms: 50,
            ..Default::default()
        },
        store.clone() as Arc<dyn VectorStore>,
        telemetry.clone() as Arc<dyn TelemetrySink>,
    )
    .expect("spawn engine");

    // let a few ticks fire
    tokio::time::sleep(Duration::from_millis(250)).await;
    let state = handle.get_system_state().await.expect("state");
    assert!(state.patterns_analyzed >= 1, "tick pipeline never ran");
    assert!(store.count(DocumentKind::Pattern) >= 1);
    handle.shutdown().await;
}

#[tokio::test]
async fn tick_failure_does_not_stop_future_ticks() {
    let store = Arc::new(InMemoryVectorStore::new());
    let telemetry = Arc::new(RecordingTelemetry::new());
    store.set_recent_data((0..100).map(|i| i as f64 * 0.5).collect());
    store.set_failing(Some("connection refused".to_string()));

    let handle = PatternEngine::spawn(
        EngineConfig {
            detection_interval_ms: 40,
            ..Default::default()
        },
        store.clone() as Arc<dyn VectorStore>,
        telemetry as Arc<dyn TelemetrySink>,
    )
    .expect("spawn engine");

    tokio::time::sleep(Duration::from_millis(120)).await;
    // loop still alive and serving after failed ticks
    store.set_failing(None);
    tokio::time::sleep(Duration::from_millis(120)).await;

    let state = handle.get_system_state().await.expect("state");
    assert!(state.patterns_analyzed >= 1, "recovered tick never ran");
    handle.shutdown().await;
}

#[tokio::test]
async fn operations_are_atomic_across_clients() {
    let (handle, _, _) = spawn(quiet());

    let baseline = gaussian(100, 10.0, 2.0, 6);
    let mut tasks = Vec::new();
    for client in 0..8u64 {
        let handle = handle.clone();
        let baseline = baseline.clone();
        tasks.push(tokio::spawn(async move {
            let data = vec![10.0, 10.5, 200.0 + client as f64];
            handle
                .detect_anomaly(data, Some(baseline), None)
                .await
                .expect("detect")
        }));
    }
    for task in tasks {
        let (report, _) = task.await.expect("join");
        assert!(report.anomaly_detected);
    }

    let state = handle.get_system_state().await.expect("state");
    // every call counted exactly once despite interleaving
    assert_eq!(state.anomalies_detected, 8);
    assert_eq!(state.anomaly_count, 8);
    handle.shutdown().await;
}
