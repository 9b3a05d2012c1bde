//! Vector-store wire shapes.
//!
//! The store speaks JSON documents over HTTP; these types define the payload
//! contract the adapter implements. `content` carries the full serialized
//! record so decoding it reproduces the logical fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default dimensionality of stored vectors.
pub const DEFAULT_VECTOR_DIMENSIONS: usize = 384;

/// Persisted record category.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pattern,
    Anomaly,
    Correlation,
}

/// A document stored in the vector store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VectorDocument {
    /// Record identifier (`pat_`/`anom_`/`corr_` prefixed).
    pub id: String,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub timestamp: DateTime<Utc>,
    /// Encoded feature vector, L2-normalized.
    pub vector: Vec<f32>,
    /// Type-specific summary fields used for filtered queries.
    pub metadata: Value,
    /// Full serialized record.
    pub content: Value,
}

/// One hit from a similarity search.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchMatch {
    pub id: String,
    /// Similarity score, higher is closer.
    pub score: f64,
    pub content: Value,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
}
