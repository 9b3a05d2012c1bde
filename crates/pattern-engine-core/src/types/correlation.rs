//! Correlation and causal-analysis records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Correlation method selected for multi-method scoring.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationMethod {
    Pearson,
    Spearman,
    Kendall,
    MutualInformation,
}

impl CorrelationMethod {
    /// All four methods, the default selection.
    pub fn all() -> [CorrelationMethod; 4] {
        [
            Self::Pearson,
            Self::Spearman,
            Self::Kendall,
            Self::MutualInformation,
        ]
    }

    /// Fixed blending weight of this method.
    pub fn weight(self) -> f64 {
        match self {
            Self::Pearson => 1.0,
            Self::Spearman => 0.9,
            Self::Kendall => 0.8,
            Self::MutualInformation => 1.1,
        }
    }
}

/// Sign of a retained relationship.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Positive,
    Negative,
}

impl Direction {
    /// Direction from the sign of a correlation value.
    pub fn from_sign(value: f64) -> Self {
        if value < 0.0 {
            Self::Negative
        } else {
            Self::Positive
        }
    }
}

/// Dense symmetric correlation matrix with unit diagonal.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CorrelationMatrix {
    size: usize,
    /// Row-major storage, size × size.
    values: Vec<f64>,
}

impl CorrelationMatrix {
    /// Identity-diagonal matrix for `size` inputs.
    pub fn new(size: usize) -> Self {
        let mut values = vec![0.0; size * size];
        for i in 0..size {
            values[i * size + i] = 1.0;
        }
        Self { size, values }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Entry at (row, col); out-of-range indices read as 0.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        if row >= self.size || col >= self.size {
            return 0.0;
        }
        self.values[row * self.size + col]
    }

    /// Set both (row, col) and (col, row), preserving symmetry.
    pub fn set_symmetric(&mut self, row: usize, col: usize, value: f64) {
        if row >= self.size || col >= self.size {
            return;
        }
        self.values[row * self.size + col] = value;
        self.values[col * self.size + row] = value;
    }
}

/// A retained pairwise relationship (i < j, |r| above threshold).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Relationship {
    /// Index of the first input.
    pub source: usize,
    /// Index of the second input.
    pub target: usize,
    /// Blended correlation in [-1, 1].
    pub correlation: f64,
    /// |correlation|.
    pub strength: f64,
    pub direction: Direction,
    /// 1 minus the width of the Fisher-z 95% interval, in [0, 1].
    pub confidence: f64,
}

/// A directed causal edge accepted by the Granger screen.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CausalLink {
    /// Leading input index.
    pub source: usize,
    /// Following input index.
    pub target: usize,
    /// Granger F-statistic for source → target.
    pub f_statistic: f64,
    /// Lag (in samples) at which |r| peaks; positive means source leads.
    pub optimal_lag: i64,
    /// Both directions passed the screen.
    pub bidirectional: bool,
}

/// Directed causal graph stored as indices.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct CausalGraph {
    /// Input indices participating in at least one link.
    pub nodes: Vec<usize>,
    /// Directed (source, target) pairs.
    pub edges: Vec<(usize, usize)>,
}

impl CausalGraph {
    fn out_degree(&self, node: usize) -> usize {
        self.edges.iter().filter(|(s, _)| *s == node).count()
    }

    fn in_degree(&self, node: usize) -> usize {
        self.edges.iter().filter(|(_, t)| *t == node).count()
    }

    /// Nodes with outgoing links and no incoming links.
    pub fn root_causes(&self) -> Vec<usize> {
        self.nodes
            .iter()
            .copied()
            .filter(|&n| self.out_degree(n) > 0 && self.in_degree(n) == 0)
            .collect()
    }

    /// Nodes with incoming links and no outgoing links.
    pub fn effects(&self) -> Vec<usize> {
        self.nodes
            .iter()
            .copied()
            .filter(|&n| self.in_degree(n) > 0 && self.out_degree(n) == 0)
            .collect()
    }
}

/// A pair excluded from causal screening, with the reason.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CausalSkip {
    pub source: usize,
    pub target: usize,
    pub reason: String,
}

/// Result of the opt-in causal screen over retained relationships.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct CausalAnalysis {
    pub links: Vec<CausalLink>,
    pub graph: CausalGraph,
    pub root_causes: Vec<usize>,
    pub effects: Vec<usize>,
    /// Pairs that could not be screened (insufficient data), reported
    /// per record; the overall analysis still succeeds.
    pub skipped: Vec<CausalSkip>,
}

/// Summary metrics over the relationship network.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct NetworkMetrics {
    /// Unique relationship endpoints.
    pub nodes: usize,
    /// Retained relationship count.
    pub edges: usize,
    /// edges / C(nodes, 2).
    pub density: f64,
    /// Mean blended correlation over relationships.
    pub average_correlation: f64,
    /// Global transitivity: 3 × triangles / connected triples.
    pub clustering_coefficient: f64,
    /// Newman modularity over the connected-component partition.
    pub modularity: f64,
}

/// Result of a full correlation analysis over a set of inputs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CorrelationAnalysis {
    /// Minted `corr_` identifier.
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Number of inputs analyzed.
    pub pattern_count: usize,
    pub matrix: CorrelationMatrix,
    pub relationships: Vec<Relationship>,
    /// Highest-strength relationship, if any were retained.
    pub strongest: Option<Relationship>,
    /// Present only when causal screening was requested.
    pub causal: Option<CausalAnalysis>,
    pub network: NetworkMetrics,
}

impl CorrelationAnalysis {
    /// True when at least one relationship cleared the threshold.
    pub fn is_significant(&self) -> bool {
        !self.relationships.is_empty()
    }
}
