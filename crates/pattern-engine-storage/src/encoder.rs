//! Feature encoding for stored documents.
//!
//! Analysis records are flattened into numeric features, folded into a
//! fixed-dimension vector by modulo feature hashing when over-long, and
//! L2-normalized. The encoder is the pluggable half of the storage boundary;
//! the documents built here carry the full record in `content` so decoding
//! reproduces the logical fields.

use pattern_engine_core::types::document::DEFAULT_VECTOR_DIMENSIONS;
use pattern_engine_core::types::{
    AnomalyReport, CorrelationAnalysis, DocumentKind, PatternAnalysis, PatternType, Severity,
    VectorDocument,
};
use serde_json::json;

/// Modulo feature-hashing encoder with L2 normalization.
#[derive(Clone, Debug)]
pub struct HashingEncoder {
    dimensions: usize,
}

impl Default for HashingEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_VECTOR_DIMENSIONS)
    }
}

impl HashingEncoder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Fold features into the configured dimension and L2-normalize.
    ///
    /// Features beyond the dimension wrap around by index modulo; an
    /// all-zero feature vector encodes to the zero vector.
    pub fn encode(&self, features: &[f64]) -> Vec<f32> {
        let mut vector = vec![0.0f64; self.dimensions];
        for (index, &feature) in features.iter().enumerate() {
            vector[index % self.dimensions] += feature;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm == 0.0 {
            return vector.iter().map(|&v| v as f32).collect();
        }
        vector.iter().map(|&v| (v / norm) as f32).collect()
    }
}

/// Build the store document for a pattern analysis.
pub fn pattern_document(analysis: &PatternAnalysis, encoder: &HashingEncoder) -> VectorDocument {
    let mut features = vec![
        analysis.data_points as f64,
        analysis.patterns.len() as f64,
        analysis.confidence,
        analysis.dominant_strength(),
    ];
    for pattern_type in [
        PatternType::Periodic,
        PatternType::Trend,
        PatternType::Burst,
        PatternType::Decay,
        PatternType::Cyclic,
    ] {
        let summary = analysis.summary.get(&pattern_type);
        features.push(summary.map(|s| s.count as f64).unwrap_or(0.0));
        features.push(summary.map(|s| s.average_strength).unwrap_or(0.0));
        features.push(summary.map(|s| s.max_strength).unwrap_or(0.0));
    }

    VectorDocument {
        id: analysis.id.clone(),
        kind: DocumentKind::Pattern,
        timestamp: analysis.timestamp,
        vector: encoder.encode(&features),
        metadata: json!({
            "pattern_count": analysis.patterns.len(),
            "confidence": analysis.confidence,
            "dominant_type": analysis
                .dominant_pattern
                .as_ref()
                .map(|p| p.pattern_type()),
        }),
        content: serde_json::to_value(analysis).unwrap_or_default(),
    }
}

/// Build the store document for an anomaly report.
pub fn anomaly_document(report: &AnomalyReport, encoder: &HashingEncoder) -> VectorDocument {
    let mut features = vec![
        report.data_points as f64,
        report.anomaly_count as f64,
        severity_rank(report.severity),
        if report.critical { 1.0 } else { 0.0 },
    ];
    features.extend(report.anomalies.iter().take(16).map(|a| a.value()));

    VectorDocument {
        id: report.id.clone(),
        kind: DocumentKind::Anomaly,
        timestamp: report.timestamp,
        vector: encoder.encode(&features),
        metadata: json!({
            "method": report.method,
            "severity": report.severity,
            "critical": report.critical,
            "anomaly_count": report.anomaly_count,
        }),
        content: serde_json::to_value(report).unwrap_or_default(),
    }
}

/// Build the store document for a correlation analysis.
pub fn correlation_document(
    analysis: &CorrelationAnalysis,
    encoder: &HashingEncoder,
) -> VectorDocument {
    let mut features = vec![
        analysis.pattern_count as f64,
        analysis.relationships.len() as f64,
        analysis.network.density,
        analysis.network.average_correlation,
        analysis
            .strongest
            .as_ref()
            .map(|r| r.strength)
            .unwrap_or(0.0),
    ];
    features.extend(analysis.relationships.iter().take(16).map(|r| r.correlation));

    VectorDocument {
        id: analysis.id.clone(),
        kind: DocumentKind::Correlation,
        timestamp: analysis.timestamp,
        vector: encoder.encode(&features),
        metadata: json!({
            "pattern_count": analysis.pattern_count,
            "relationship_count": analysis.relationships.len(),
            "has_causal": analysis.causal.is_some(),
        }),
        content: serde_json::to_value(analysis).unwrap_or_default(),
    }
}

fn severity_rank(severity: Severity) -> f64 {
    match severity {
        Severity::None => 0.0,
        Severity::Low => 1.0,
        Severity::Medium => 2.0,
        Severity::High => 3.0,
        Severity::Critical => 4.0,
    }
}
