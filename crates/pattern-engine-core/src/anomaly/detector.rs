//! Method dispatch, classification, and reporting.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

use crate::config::constants::BATCH_DEADLINE_MS;
use crate::ident::{self, IdPrefix};
use crate::numeric::{interquartile_range, mean, std_dev};
use crate::types::{
    AnomalyMethod, AnomalyRecord, AnomalyReport, Severity, VarietyViolation,
};

use super::isolation::IsolationForest;
use super::lof::lof_scores;
use super::variety::VsmBaseline;

/// Base z threshold before tail adjustment.
const Z_BASE: f64 = 3.0;

/// Z magnitude that upgrades a statistical anomaly to high severity.
const Z_HIGH: f64 = 4.0;

/// Default isolation score flag threshold.
const ISOLATION_FLAG: f64 = 0.6;

/// Default isolation score above which severity is high.
const ISOLATION_HIGH: f64 = 0.8;

/// Default LOF flag threshold.
const LOF_FLAG: f64 = 1.5;

/// LOF above which severity is medium.
const LOF_MEDIUM: f64 = 2.0;

/// Anomaly rate above which the baseline itself is suspect.
const BASELINE_REVIEW_RATE: f64 = 0.2;

/// Options for one detection call.
#[derive(Clone, Debug)]
pub struct AnomalyOptions {
    pub method: AnomalyMethod,
    /// Flag threshold override; each method has its own default.
    pub threshold: Option<f64>,
    /// Isolation score above which severity is high.
    pub high_isolation_score: f64,
    /// Recursion depth for the vsm method.
    pub recursion_depth: u32,
    /// Seed for the isolation-forest splitters; minted fresh when absent.
    pub seed: Option<u64>,
}

impl Default for AnomalyOptions {
    fn default() -> Self {
        Self {
            method: AnomalyMethod::Statistical,
            threshold: None,
            high_isolation_score: ISOLATION_HIGH,
            recursion_depth: 5,
            seed: None,
        }
    }
}

impl AnomalyOptions {
    pub fn with_method(method: AnomalyMethod) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }
}

/// Stateless anomaly detector.
#[derive(Clone, Debug, Default)]
pub struct AnomalyDetector {
    options: AnomalyOptions,
}

impl AnomalyDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: AnomalyOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AnomalyOptions {
        &self.options
    }

    /// Run the configured method over the data against the baseline.
    ///
    /// Degenerate input (empty data, zero-spread baseline for the
    /// statistical method) reports no anomalies rather than erroring.
    pub fn detect(&self, data: &[f64], baseline: &[f64]) -> AnomalyReport {
        let anomalies = match self.options.method {
            AnomalyMethod::Statistical => self.detect_statistical(data, baseline),
            AnomalyMethod::IsolationForest => self.detect_isolation(data, baseline),
            AnomalyMethod::Lof => self.detect_lof(data, baseline),
            AnomalyMethod::VsmBased => self.detect_vsm(data, baseline),
        };
        self.classify(data, anomalies)
    }

    fn detect_statistical(&self, data: &[f64], baseline: &[f64]) -> Vec<AnomalyRecord> {
        let baseline_mean = mean(baseline);
        let baseline_std = std_dev(baseline);
        if baseline_std == 0.0 {
            return Vec::new();
        }

        let threshold = self
            .options
            .threshold
            .unwrap_or_else(|| dynamic_z_threshold(baseline, baseline_std));
        data.iter()
            .enumerate()
            .filter_map(|(index, &value)| {
                let z = (value - baseline_mean) / baseline_std;
                if z.abs() <= threshold {
                    return None;
                }
                Some(AnomalyRecord::Statistical {
                    index,
                    value,
                    severity: if z.abs() > Z_HIGH {
                        Severity::High
                    } else {
                        Severity::Low
                    },
                    z_score: z,
                    deviation: (value - baseline_mean).abs(),
                })
            })
            .collect()
    }

    fn detect_isolation(&self, data: &[f64], baseline: &[f64]) -> Vec<AnomalyRecord> {
        let seed = self
            .options
            .seed
            .unwrap_or_else(|| rand::rngs::OsRng.next_u64());
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let forest = IsolationForest::fit(baseline, &mut rng);
        let threshold = self.options.threshold.unwrap_or(ISOLATION_FLAG);

        data.iter()
            .enumerate()
            .filter_map(|(index, &value)| {
                let score = forest.score(value);
                if score <= threshold {
                    return None;
                }
                Some(AnomalyRecord::Isolation {
                    index,
                    value,
                    severity: if score > self.options.high_isolation_score {
                        Severity::High
                    } else {
                        Severity::Low
                    },
                    score,
                })
            })
            .collect()
    }

    fn detect_lof(&self, data: &[f64], baseline: &[f64]) -> Vec<AnomalyRecord> {
        let k = baseline.len().div_euclid(10).min(20).max(1);
        let threshold = self.options.threshold.unwrap_or(LOF_FLAG);
        lof_scores(data, baseline, k)
            .into_iter()
            .enumerate()
            .filter_map(|(index, score)| {
                if score <= threshold {
                    return None;
                }
                Some(AnomalyRecord::Lof {
                    index,
                    value: data[index],
                    severity: if score > LOF_MEDIUM {
                        Severity::Medium
                    } else {
                        Severity::Low
                    },
                    score,
                })
            })
            .collect()
    }

    fn detect_vsm(&self, data: &[f64], baseline: &[f64]) -> Vec<AnomalyRecord> {
        let vsm = VsmBaseline::from_series(baseline, self.options.recursion_depth);
        data.iter()
            .enumerate()
            .filter_map(|(index, &value)| {
                let violation = vsm.violation(value)?;
                let severity = match violation {
                    VarietyViolation::AlgedonicAlert => Severity::Critical,
                    VarietyViolation::RecursionBreakdown => Severity::High,
                    VarietyViolation::InsufficientVariety
                    | VarietyViolation::ExcessiveVariety => Severity::Low,
                };
                Some(AnomalyRecord::Vsm {
                    index,
                    value,
                    severity,
                    variety: super::variety::scalar_variety(value),
                    variety_ratio: vsm.variety_ratio(value),
                    violation,
                })
            })
            .collect()
    }

    /// Assemble the report: overall severity, description, recommendations.
    fn classify(&self, data: &[f64], anomalies: Vec<AnomalyRecord>) -> AnomalyReport {
        let severity = anomalies
            .iter()
            .map(AnomalyRecord::severity)
            .max()
            .unwrap_or(Severity::None);
        let critical = anomalies
            .iter()
            .any(|a| a.severity() == Severity::Critical);
        let anomaly_count = anomalies.len();
        let recommendations = recommendations(&anomalies, data.len(), critical);
        let description = describe(&anomalies, self.options.method, data.len());
        debug!(
            method = ?self.options.method,
            count = anomaly_count,
            ?severity,
            "anomaly detection"
        );

        AnomalyReport {
            id: ident::mint(IdPrefix::Anomaly),
            timestamp: Utc::now(),
            method: self.options.method,
            data_points: data.len(),
            anomaly_detected: anomaly_count > 0,
            anomaly_count,
            anomalies,
            severity,
            critical,
            description,
            recommendations,
        }
    }

    /// Fan one detection task out per stream, join under a fixed deadline,
    /// and keep only the streams that reported anomalies. Stragglers past
    /// the deadline are abandoned.
    pub async fn detect_batch(
        &self,
        streams: HashMap<String, Vec<f64>>,
        baseline: Vec<f64>,
    ) -> HashMap<String, AnomalyReport> {
        let deadline = Instant::now() + Duration::from_millis(BATCH_DEADLINE_MS);
        let handles: Vec<(String, tokio::task::JoinHandle<AnomalyReport>)> = streams
            .into_iter()
            .map(|(stream_id, data)| {
                let detector = self.clone();
                let baseline = baseline.clone();
                (
                    stream_id,
                    tokio::spawn(async move { detector.detect(&data, &baseline) }),
                )
            })
            .collect();

        let mut results = HashMap::new();
        for (stream_id, handle) in handles {
            match timeout_at(deadline, handle).await {
                Ok(Ok(report)) => {
                    if report.anomaly_detected {
                        results.insert(stream_id, report);
                    }
                }
                Ok(Err(join_error)) => {
                    warn!(stream = %stream_id, error = %join_error, "detection task failed");
                }
                Err(_) => {
                    warn!(stream = %stream_id, "detection task missed the batch deadline");
                }
            }
        }
        results
    }
}

/// Dynamic z threshold: base 3.0, widened for light tails and narrowed for
/// heavy tails as measured by IQR relative to sigma.
fn dynamic_z_threshold(baseline: &[f64], baseline_std: f64) -> f64 {
    let tail_ratio = interquartile_range(baseline) / baseline_std;
    if tail_ratio > 1.5 {
        Z_BASE - 0.5
    } else if tail_ratio < 0.8 {
        Z_BASE + 0.5
    } else {
        Z_BASE
    }
}

fn describe(anomalies: &[AnomalyRecord], method: AnomalyMethod, data_points: usize) -> String {
    if anomalies.is_empty() {
        return format!("no anomalies in {data_points} samples ({method:?})");
    }
    let mut indices: Vec<String> = anomalies
        .iter()
        .take(5)
        .map(|a| format!("index {} (value {:.3})", a.index(), a.value()))
        .collect();
    if anomalies.len() > 5 {
        indices.push(format!("and {} more", anomalies.len() - 5));
    }
    format!(
        "{} of {} samples anomalous ({:?}): {}",
        anomalies.len(),
        data_points,
        method,
        indices.join(", ")
    )
}

fn recommendations(
    anomalies: &[AnomalyRecord],
    data_points: usize,
    critical: bool,
) -> Vec<String> {
    let mut recommendations = Vec::new();
    let mut push_once = |text: &str| {
        if !recommendations.iter().any(|r: &String| r.as_str() == text) {
            recommendations.push(text.to_string());
        }
    };

    for anomaly in anomalies {
        match anomaly.violation() {
            Some(VarietyViolation::InsufficientVariety) => {
                push_once(
                    "increase variety: amplify system responses to match environmental demand",
                );
            }
            Some(VarietyViolation::ExcessiveVariety) => {
                push_once("apply variety filters to attenuate incoming complexity");
            }
            Some(VarietyViolation::RecursionBreakdown) => {
                push_once("check recursion channels between control levels");
            }
            Some(VarietyViolation::AlgedonicAlert) | None => {}
        }
    }
    if critical {
        push_once("activate algedonic response");
    }
    if data_points > 0 && anomalies.len() as f64 / data_points as f64 > BASELINE_REVIEW_RATE {
        push_once("review baseline: anomaly rate exceeds 20%");
    }
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    /// ~N(10, 2^2) via sum of uniforms.
    fn gaussian_baseline(n: usize, seed: u64) -> Vec<f64> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..n)
            .map(|_| {
                let unit: f64 = (0..12).map(|_| rng.gen_range(0.0..1.0)).sum::<f64>() - 6.0;
                10.0 + 2.0 * unit
            })
            .collect()
    }

    #[test]
    fn test_statistical_flags_spike() {
        let baseline = gaussian_baseline(100, 1);
        let data = [10.0, 11.0, 9.0, 50.0, 10.0, 11.0];
        let report = AnomalyDetector::new().detect(&data, &baseline);

        assert!(report.anomaly_detected);
        assert_eq!(report.anomaly_count, 1);
        assert_eq!(report.anomalies[0].index(), 3);
        assert!(matches!(report.severity, Severity::High | Severity::Medium));
        assert!(report.description.contains("index 3"));
        assert!(!report.critical);
    }

    #[test]
    fn test_statistical_all_identical_baseline() {
        let baseline = vec![5.0; 100];
        let data = [5.0, 500.0, -500.0];
        let report = AnomalyDetector::new().detect(&data, &baseline);
        assert!(!report.anomaly_detected);
        assert_eq!(report.severity, Severity::None);
    }

    #[test]
    fn test_statistical_explicit_threshold() {
        let baseline = gaussian_baseline(100, 2);
        let data = [10.0, 16.5];
        let lax = AnomalyDetector::with_options(AnomalyOptions {
            threshold: Some(10.0),
            ..Default::default()
        });
        assert!(!lax.detect(&data, &baseline).anomaly_detected);

        let strict = AnomalyDetector::with_options(AnomalyOptions {
            threshold: Some(2.0),
            ..Default::default()
        });
        assert!(strict.detect(&data, &baseline).anomaly_detected);
    }

    #[test]
    fn test_dynamic_threshold_tail_adjustment() {
        // normal-ish tails: IQR/sigma around 1.35 keeps the base threshold
        let baseline = gaussian_baseline(500, 3);
        let threshold = dynamic_z_threshold(&baseline, std_dev(&baseline));
        assert_eq!(threshold, Z_BASE);

        // heavy-tailed spread widens IQR relative to sigma past 1.5
        let uniformish: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let ratio = interquartile_range(&uniformish) / std_dev(&uniformish);
        assert!(ratio > 1.5);
        assert_eq!(
            dynamic_z_threshold(&uniformish, std_dev(&uniformish)),
            Z_BASE - 0.5
        );
    }

    #[test]
    fn test_isolation_forest_flags_outlier() {
        let baseline: Vec<f64> = (0..200).map(|i| i as f64 * 0.05).collect();
        let detector = AnomalyDetector::with_options(AnomalyOptions {
            method: AnomalyMethod::IsolationForest,
            seed: Some(17),
            ..Default::default()
        });
        let report = detector.detect(&[5.0, 500.0], &baseline);
        assert!(report.anomaly_detected);
        assert!(report.anomalies.iter().any(|a| a.index() == 1));
        assert!(report.anomalies.iter().all(|a| match a {
            AnomalyRecord::Isolation { score, .. } => *score > 0.0 && *score <= 1.0,
            _ => false,
        }));
    }

    #[test]
    fn test_lof_flags_outlier() {
        let baseline: Vec<f64> = (0..100).map(|i| i as f64 * 0.1).collect();
        let detector =
            AnomalyDetector::with_options(AnomalyOptions::with_method(AnomalyMethod::Lof));
        let report = detector.detect(&[5.0, 100.0], &baseline);
        assert!(report.anomaly_detected);
        assert_eq!(report.anomalies.len(), 1);
        assert_eq!(report.anomalies[0].index(), 1);
    }

    #[test]
    fn test_vsm_algedonic_critical() {
        let baseline = gaussian_baseline(100, 4);
        let detector =
            AnomalyDetector::with_options(AnomalyOptions::with_method(AnomalyMethod::VsmBased));
        // beyond mean + 4 sigma of the baseline magnitudes
        let report = detector.detect(&[10.0, 50.0], &baseline);

        assert!(report.critical);
        assert_eq!(report.severity, Severity::Critical);
        let critical_record = report
            .anomalies
            .iter()
            .find(|a| a.index() == 1)
            .expect("flagged");
        assert_eq!(
            critical_record.violation(),
            Some(VarietyViolation::AlgedonicAlert)
        );
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.contains("algedonic")));
    }

    #[test]
    fn test_recommendations_for_violations() {
        let records = vec![
            AnomalyRecord::Vsm {
                index: 0,
                value: 1.0,
                severity: Severity::Low,
                variety: 0.5,
                variety_ratio: 0.1,
                violation: VarietyViolation::InsufficientVariety,
            },
            AnomalyRecord::Vsm {
                index: 1,
                value: 900.0,
                severity: Severity::Low,
                variety: 6000.0,
                variety_ratio: 3.0,
                violation: VarietyViolation::ExcessiveVariety,
            },
        ];
        let recs = recommendations(&records, 4, false);
        assert!(recs.iter().any(|r| r.contains("increase variety")));
        assert!(recs.iter().any(|r| r.contains("apply variety filters")));
        // 2 of 4 samples anomalous: rate above 20%
        assert!(recs.iter().any(|r| r.contains("review baseline")));
    }

    #[test]
    fn test_empty_data_reports_nothing() {
        let report = AnomalyDetector::new().detect(&[], &gaussian_baseline(50, 5));
        assert!(!report.anomaly_detected);
        assert_eq!(report.anomaly_count, 0);
        assert_eq!(report.severity, Severity::None);
        assert!(report.recommendations.is_empty());
    }

    #[tokio::test]
    async fn test_batch_filters_to_detected() {
        let baseline = gaussian_baseline(100, 6);
        let mut streams = HashMap::new();
        streams.insert("calm".to_string(), vec![10.0, 10.5, 9.5]);
        streams.insert("spiky".to_string(), vec![10.0, 90.0, 10.0]);

        let results = AnomalyDetector::new().detect_batch(streams, baseline).await;
        assert!(results.contains_key("spiky"));
        assert!(!results.contains_key("calm"));
        assert_eq!(results["spiky"].anomalies[0].index(), 1);
    }

    #[tokio::test]
    async fn test_batch_empty_input() {
        let results = AnomalyDetector::new()
            .detect_batch(HashMap::new(), vec![1.0, 2.0])
            .await;
        assert!(results.is_empty());
    }
}
