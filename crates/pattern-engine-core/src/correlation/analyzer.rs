//! Multi-method pairwise correlation and relationship extraction.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ident::{self, IdPrefix};
use crate::numeric::{kendall, mean, mutual_information, pearson, spearman};
use crate::types::{
    CorrelationAnalysis, CorrelationMatrix, CorrelationMethod, Direction, NetworkMetrics,
    Relationship,
};

use super::causal::screen_causality;

/// Default minimum |r| for a pair to be retained.
const DEFAULT_THRESHOLD: f64 = 0.5;

/// Default Granger lag order.
const DEFAULT_LAG_ORDER: usize = 2;

/// A correlation input exposing a numeric sequence.
///
/// Pattern-like inputs arrive in one of three shapes; all collapse to a
/// plain series before analysis.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SignalInput {
    /// Raw samples as captured.
    RawData(Vec<f64>),
    /// Pre-extracted values.
    Values(Vec<f64>),
    /// Timestamped series; only the values participate.
    TimeSeries(Vec<(i64, f64)>),
}

impl SignalInput {
    /// The numeric sequence of this input.
    pub fn series(&self) -> Cow<'_, [f64]> {
        match self {
            Self::RawData(values) | Self::Values(values) => Cow::Borrowed(values),
            Self::TimeSeries(points) => Cow::Owned(points.iter().map(|(_, v)| *v).collect()),
        }
    }
}

impl From<Vec<f64>> for SignalInput {
    fn from(values: Vec<f64>) -> Self {
        Self::RawData(values)
    }
}

/// Options for the correlation analyzer.
#[derive(Clone, Debug)]
pub struct CorrelationOptions {
    /// Methods blended into the pairwise score.
    pub methods: Vec<CorrelationMethod>,
    /// Minimum |r| for a relationship to be retained.
    pub threshold: f64,
    /// Run the Granger screen over retained relationships.
    pub analyze_causality: bool,
    /// Lag order for the Granger models.
    pub lag_order: usize,
}

impl Default for CorrelationOptions {
    fn default() -> Self {
        Self {
            methods: CorrelationMethod::all().to_vec(),
            threshold: DEFAULT_THRESHOLD,
            analyze_causality: false,
            lag_order: DEFAULT_LAG_ORDER,
        }
    }
}

/// Blend the selected methods into one correlation score.
///
/// Inputs are aligned to the common minimum length by each method; the
/// result is the weight-normalized sum. Mutual information contributes its
/// normalized value.
pub fn multi_method_correlation(a: &[f64], b: &[f64], methods: &[CorrelationMethod]) -> f64 {
    if methods.is_empty() {
        return 0.0;
    }
    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    for method in methods {
        let value = match method {
            CorrelationMethod::Pearson => pearson(a, b),
            CorrelationMethod::Spearman => spearman(a, b),
            CorrelationMethod::Kendall => kendall(a, b),
            CorrelationMethod::MutualInformation => mutual_information(a, b, true),
        };
        weighted += value * method.weight();
        total_weight += method.weight();
    }
    weighted / total_weight
}

/// Stateless correlation analyzer.
#[derive(Clone, Debug, Default)]
pub struct CorrelationAnalyzer {
    options: CorrelationOptions,
}

impl CorrelationAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CorrelationOptions) -> Self {
        Self { options }
    }

    /// Analyze a set of inputs into a correlation result.
    ///
    /// An empty input set yields an empty matrix and no relationships.
    pub fn analyze(&self, inputs: &[SignalInput]) -> CorrelationAnalysis {
        let series: Vec<Vec<f64>> = inputs.iter().map(|i| i.series().into_owned()).collect();

        let mut matrix = CorrelationMatrix::new(series.len());
        for i in 0..series.len() {
            for j in (i + 1)..series.len() {
                let r = multi_method_correlation(&series[i], &series[j], &self.options.methods);
                matrix.set_symmetric(i, j, r);
            }
        }

        let mut relationships = Vec::new();
        for i in 0..series.len() {
            for j in (i + 1)..series.len() {
                let r = matrix.get(i, j);
                if r.abs() < self.options.threshold {
                    continue;
                }
                let aligned = series[i].len().min(series[j].len());
                relationships.push(Relationship {
                    source: i,
                    target: j,
                    correlation: r,
                    strength: r.abs(),
                    direction: Direction::from_sign(r),
                    confidence: fisher_confidence(r, aligned),
                });
            }
        }
        debug!(
            inputs = series.len(),
            retained = relationships.len(),
            "correlation analysis"
        );

        let strongest = relationships
            .iter()
            .max_by(|a, b| {
                a.strength
                    .partial_cmp(&b.strength)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .cloned();

        let causal = self
            .options
            .analyze_causality
            .then(|| screen_causality(&series, &relationships, self.options.lag_order));

        let network = network_metrics(&relationships);

        CorrelationAnalysis {
            id: ident::mint(IdPrefix::Correlation),
            timestamp: Utc::now(),
            pattern_count: series.len(),
            matrix,
            relationships,
            strongest,
            causal,
            network,
        }
    }
}

/// Confidence from the Fisher-z 95% interval: 1 minus the interval width,
/// floored at 0. Needs more than three samples.
fn fisher_confidence(r: f64, n: usize) -> f64 {
    if n < 4 {
        return 0.0;
    }
    let z = r.clamp(-0.999_999, 0.999_999).atanh();
    let se = 1.0 / ((n - 3) as f64).sqrt();
    let lower = (z - 1.96 * se).tanh();
    let upper = (z + 1.96 * se).tanh();
    1.0 - (upper - lower).min(1.0)
}

/// Metrics over the undirected relationship network.
///
/// Clustering is the global transitivity (3 × triangles over connected
/// triples); modularity is Newman's Q over the connected-component
/// partition.
fn network_metrics(relationships: &[Relationship]) -> NetworkMetrics {
    let endpoints: HashSet<usize> = relationships
        .iter()
        .flat_map(|r| [r.source, r.target])
        .collect();
    let nodes = endpoints.len();
    let edges = relationships.len();
    if edges == 0 {
        return NetworkMetrics::default();
    }

    let possible = nodes * nodes.saturating_sub(1) / 2;
    let density = if possible == 0 {
        0.0
    } else {
        edges as f64 / possible as f64
    };
    let correlations: Vec<f64> = relationships.iter().map(|r| r.correlation).collect();

    let mut adjacency: HashMap<usize, HashSet<usize>> = HashMap::new();
    for r in relationships {
        adjacency.entry(r.source).or_default().insert(r.target);
        adjacency.entry(r.target).or_default().insert(r.source);
    }

    NetworkMetrics {
        nodes,
        edges,
        density,
        average_correlation: mean(&correlations),
        clustering_coefficient: transitivity(&adjacency),
        modularity: component_modularity(&adjacency, edges),
    }
}

fn transitivity(adjacency: &HashMap<usize, HashSet<usize>>) -> f64 {
    let mut nodes: Vec<usize> = adjacency.keys().copied().collect();
    nodes.sort_unstable();

    let mut triangles = 0usize;
    for (a_pos, &a) in nodes.iter().enumerate() {
        for (b_pos, &b) in nodes.iter().enumerate().skip(a_pos + 1) {
            if !adjacency[&a].contains(&b) {
                continue;
            }
            for &c in nodes.iter().skip(b_pos + 1) {
                if adjacency[&a].contains(&c) && adjacency[&b].contains(&c) {
                    triangles += 1;
                }
            }
        }
    }

    let triples: usize = adjacency
        .values()
        .map(|neighbors| neighbors.len() * neighbors.len().saturating_sub(1) / 2)
        .sum();
    if triples == 0 {
        return 0.0;
    }
    3.0 * triangles as f64 / triples as f64
}

fn component_modularity(adjacency: &HashMap<usize, HashSet<usize>>, edges: usize) -> f64 {
    // flood-fill components, then Q = sum(e_c - a_c^2) with every edge
    // internal to its component
    let mut visited: HashSet<usize> = HashSet::new();
    let mut q = 0.0;
    let total_degree = (2 * edges) as f64;
    for &start in adjacency.keys() {
        if visited.contains(&start) {
            continue;
        }
        let mut stack = vec![start];
        let mut component_degree = 0usize;
        let mut component_edges = 0usize;
        while let Some(node) = stack.pop() {
            if !visited.insert(node) {
                continue;
            }
            let neighbors = &adjacency[&node];
            component_degree += neighbors.len();
            // every edge is internal to its component: half the degree sum
            component_edges += neighbors.len();
            for &next in neighbors {
                if !visited.contains(&next) {
                    stack.push(next);
                }
            }
        }
        let e_c = (component_edges / 2) as f64 / edges as f64;
        let a_c = component_degree as f64 / total_degree;
        q += e_c - a_c * a_c;
    }
    q
}
