//! Granger-style causal screening over retained relationships.

use tracing::debug;

use crate::config::constants::{GRANGER_F_THRESHOLD, GRANGER_MIN_SAMPLES};
use crate::error::AnalysisError;
use crate::numeric::solve_least_squares;
use crate::types::{CausalAnalysis, CausalGraph, CausalLink, CausalSkip, Relationship};

use super::lag::find_optimal_lag;

/// Cap applied when the unrestricted model fits perfectly; keeps the
/// statistic finite and serializable.
const F_CAP: f64 = 1e6;

/// Granger F-statistic for `cause` → `effect` at lag order `p`.
///
/// The restricted model regresses the effect on its own p lags; the
/// unrestricted model adds the cause's p lags. The statistic compares the
/// residual sums of squares: F = ((RSSr - RSSu)/p) / (RSSu/(n - 2p - 1)).
/// Returns None when the series are too short for the model or the
/// regressions are singular.
pub fn granger_f_statistic(cause: &[f64], effect: &[f64], p: usize) -> Option<f64> {
    let n = cause.len().min(effect.len());
    if p == 0 || n <= 2 * p + 1 {
        return None;
    }

    let observations = n - p;
    let mut restricted_rows = Vec::with_capacity(observations);
    let mut unrestricted_rows = Vec::with_capacity(observations);
    let mut targets = Vec::with_capacity(observations);
    for t in p..n {
        let mut restricted = Vec::with_capacity(1 + p);
        restricted.push(1.0);
        for lag in 1..=p {
            restricted.push(effect[t - lag]);
        }
        let mut unrestricted = restricted.clone();
        for lag in 1..=p {
            unrestricted.push(cause[t - lag]);
        }
        restricted_rows.push(restricted);
        unrestricted_rows.push(unrestricted);
        targets.push(effect[t]);
    }

    let rss_restricted = residual_sum_of_squares(&restricted_rows, &targets)?;
    let rss_unrestricted = residual_sum_of_squares(&unrestricted_rows, &targets)?;

    let df = observations as f64 - (2 * p + 1) as f64;
    if df <= 0.0 {
        return None;
    }
    if rss_unrestricted <= f64::EPSILON * targets.len() as f64 {
        return Some(F_CAP);
    }

    let f = ((rss_restricted - rss_unrestricted) / p as f64) / (rss_unrestricted / df);
    Some(f.max(0.0).min(F_CAP))
}

fn residual_sum_of_squares(rows: &[Vec<f64>], targets: &[f64]) -> Option<f64> {
    let beta = solve_least_squares(rows, targets)?;
    Some(
        rows.iter()
            .zip(targets)
            .map(|(row, &y)| {
                let predicted: f64 = row.iter().zip(&beta).map(|(x, b)| x * b).sum();
                (y - predicted) * (y - predicted)
            })
            .sum(),
    )
}

/// Screen retained relationships for causal direction.
///
/// Each relationship with both series at least 20 samples long is tested in
/// both directions; a direction is accepted when its F-statistic exceeds 3.
/// Too-short pairs are reported in `skipped` rather than failing the call.
pub fn screen_causality(
    series: &[Vec<f64>],
    relationships: &[Relationship],
    lag_order: usize,
) -> CausalAnalysis {
    let mut analysis = CausalAnalysis::default();

    for relationship in relationships {
        let a = &series[relationship.source];
        let b = &series[relationship.target];
        let shorter = a.len().min(b.len());
        if shorter < GRANGER_MIN_SAMPLES {
            analysis.skipped.push(CausalSkip {
                source: relationship.source,
                target: relationship.target,
                reason: AnalysisError::InsufficientData {
                    required: GRANGER_MIN_SAMPLES,
                    actual: shorter,
                }
                .to_string(),
            });
            continue;
        }

        let forward = granger_f_statistic(a, b, lag_order).unwrap_or(0.0);
        let backward = granger_f_statistic(b, a, lag_order).unwrap_or(0.0);
        let forward_passes = forward > GRANGER_F_THRESHOLD;
        let backward_passes = backward > GRANGER_F_THRESHOLD;
        if !forward_passes && !backward_passes {
            continue;
        }

        let profile = find_optimal_lag(a, b);
        debug!(
            source = relationship.source,
            target = relationship.target,
            forward,
            backward,
            optimal_lag = profile.optimal_lag,
            "causal screen"
        );

        if forward_passes {
            analysis.links.push(CausalLink {
                source: relationship.source,
                target: relationship.target,
                f_statistic: forward,
                optimal_lag: profile.optimal_lag,
                bidirectional: backward_passes,
            });
        }
        if backward_passes {
            analysis.links.push(CausalLink {
                source: relationship.target,
                target: relationship.source,
                f_statistic: backward,
                optimal_lag: -profile.optimal_lag,
                bidirectional: forward_passes,
            });
        }
    }

    let mut nodes: Vec<usize> = analysis
        .links
        .iter()
        .flat_map(|link| [link.source, link.target])
        .collect();
    nodes.sort_unstable();
    nodes.dedup();
    let edges = analysis
        .links
        .iter()
        .map(|link| (link.source, link.target))
        .collect();
    analysis.graph = CausalGraph { nodes, edges };
    analysis.root_causes = analysis.graph.root_causes();
    analysis.effects = analysis.graph.effects();
    analysis
}
