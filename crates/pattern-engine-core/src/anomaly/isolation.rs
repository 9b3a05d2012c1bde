//! Isolation forest over one-dimensional baselines.
//!
//! Anomalous values are isolated by fewer random splits than ordinary ones.
//! Splitters draw from an injected RNG so scores are reproducible under a
//! fixed seed.

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::config::constants::{ISOLATION_MAX_DEPTH, ISOLATION_SUBSAMPLE, ISOLATION_TREES};

/// Euler–Mascheroni constant for the average-path normalizer.
const EULER_GAMMA: f64 = 0.577_215_664_9;

/// Expected path length of an unsuccessful BST search over n values.
///
/// c(n) = 2(ln(n-1) + γ) - 2(n-1)/n for n > 2; 1 otherwise.
pub fn average_path_length(n: usize) -> f64 {
    if n > 2 {
        let nf = n as f64;
        2.0 * ((nf - 1.0).ln() + EULER_GAMMA) - 2.0 * (nf - 1.0) / nf
    } else {
        1.0
    }
}

enum Node {
    Split {
        value: f64,
        below: Box<Node>,
        above: Box<Node>,
    },
    Leaf {
        size: usize,
    },
}

impl Node {
    fn build(values: &[f64], depth: usize, rng: &mut ChaCha8Rng) -> Node {
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if depth >= ISOLATION_MAX_DEPTH || values.len() <= 1 || min == max {
            return Node::Leaf {
                size: values.len(),
            };
        }

        let split = rng.gen_range(min..max);
        let (below, above): (Vec<f64>, Vec<f64>) = values.iter().partition(|&&v| v < split);
        // a split inside (min, max) always separates at least the extremes
        debug_assert!(!below.is_empty() && !above.is_empty());

        Node::Split {
            value: split,
            below: Box::new(Node::build(&below, depth + 1, rng)),
            above: Box::new(Node::build(&above, depth + 1, rng)),
        }
    }

    fn path_length(&self, value: f64, depth: f64) -> f64 {
        match self {
            Node::Leaf { size } => depth + average_path_length(*size),
            Node::Split {
                value: split,
                below,
                above,
            } => {
                if value < *split {
                    below.path_length(value, depth + 1.0)
                } else {
                    above.path_length(value, depth + 1.0)
                }
            }
        }
    }
}

/// An ensemble of randomized isolation trees.
pub struct IsolationForest {
    trees: Vec<Node>,
    subsample_size: usize,
}

impl IsolationForest {
    /// Fit 100 trees over random subsamples of the baseline.
    ///
    /// Subsamples are capped at 256 values; trees stop at depth 10 or a
    /// single distinct value.
    pub fn fit(baseline: &[f64], rng: &mut ChaCha8Rng) -> Self {
        let subsample_size = baseline.len().min(ISOLATION_SUBSAMPLE);
        let trees = if subsample_size == 0 {
            Vec::new()
        } else {
            (0..ISOLATION_TREES)
                .map(|_| {
                    let sample: Vec<f64> = baseline
                        .choose_multiple(rng, subsample_size)
                        .cloned()
                        .collect();
                    Node::build(&sample, 0, rng)
                })
                .collect()
        };
        Self {
            trees,
            subsample_size,
        }
    }

    /// Anomaly score in (0, 1]: 2^(-avg path length / c(n)).
    ///
    /// Close to 1 means quickly isolated, close to 0.5 means ordinary.
    pub fn score(&self, value: f64) -> f64 {
        if self.trees.is_empty() {
            return 0.5;
        }
        let total: f64 = self
            .trees
            .iter()
            .map(|tree| tree.path_length(value, 0.0))
            .sum();
        let avg = total / self.trees.len() as f64;
        2f64.powf(-avg / average_path_length(self.subsample_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn spread_baseline() -> Vec<f64> {
        // 200 distinct values spread evenly over [0, 10)
        (0..200).map(|i| i as f64 * 0.05).collect()
    }

    #[test]
    fn test_average_path_length() {
        assert_eq!(average_path_length(0), 1.0);
        assert_eq!(average_path_length(1), 1.0);
        assert_eq!(average_path_length(2), 1.0);
        // c(256) is about 10.24
        let c = average_path_length(256);
        assert!(c > 10.0 && c < 10.5, "c(256) = {c}");
    }

    #[test]
    fn test_outlier_scores_higher_than_inlier() {
        let baseline = spread_baseline();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let forest = IsolationForest::fit(&baseline, &mut rng);

        let inlier = forest.score(5.0);
        let outlier = forest.score(100.0);
        assert!(outlier > inlier, "outlier {outlier} <= inlier {inlier}");
        assert!(outlier > 0.6);
    }

    #[test]
    fn test_scores_within_unit_interval() {
        let baseline = spread_baseline();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let forest = IsolationForest::fit(&baseline, &mut rng);
        for value in [-1e6, -3.0, 9.9, 10.0, 11.0, 1e6] {
            let score = forest.score(value);
            assert!(score > 0.0 && score <= 1.0, "score({value}) = {score}");
        }
    }

    #[test]
    fn test_seeded_scores_reproducible() {
        let baseline = spread_baseline();
        let forest_a = IsolationForest::fit(&baseline, &mut ChaCha8Rng::seed_from_u64(99));
        let forest_b = IsolationForest::fit(&baseline, &mut ChaCha8Rng::seed_from_u64(99));
        for value in [5.0, 10.0, 42.0] {
            assert_eq!(forest_a.score(value), forest_b.score(value));
        }
    }

    #[test]
    fn test_empty_baseline_neutral_score() {
        let forest = IsolationForest::fit(&[], &mut ChaCha8Rng::seed_from_u64(1));
        assert_eq!(forest.score(5.0), 0.5);
    }

    #[test]
    fn test_constant_baseline_collapses_to_leaves() {
        let baseline = vec![4.0; 300];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let forest = IsolationForest::fit(&baseline, &mut rng);
        // every tree is a single leaf: paths are identical for all inputs
        assert_eq!(forest.score(4.0), forest.score(400.0));
    }
}
