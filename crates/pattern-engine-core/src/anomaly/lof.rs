//! Local outlier factor over one-dimensional baselines.
//!
//! Compares the local density around each value with the densities around
//! its nearest baseline neighbors. A factor near 1 means comparable density;
//! well above 1 means the value sits in a sparser region than its neighbors.

/// Score returned when the value's own reachability collapses to zero
/// density while its neighborhood does not.
const DEGENERATE_SCORE: f64 = 2.0;

/// LOF score for every value against the baseline.
///
/// `k` is the neighborhood size; it is clamped to the baseline length.
/// Reach-distance is max(distance, neighbor's own k-distance); local
/// reachability density is k over the summed reach-distances. A zero-density
/// value next to a dense neighborhood scores 2.0.
pub fn lof_scores(data: &[f64], baseline: &[f64], k: usize) -> Vec<f64> {
    if baseline.is_empty() || k == 0 {
        return vec![0.0; data.len()];
    }
    let k = k.min(baseline.len());

    // per-baseline-point k-distances and local reachability densities
    let k_distances: Vec<f64> = (0..baseline.len())
        .map(|i| {
            let mut dists: Vec<f64> = baseline
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, &v)| (baseline[i] - v).abs())
                .collect();
            dists.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            dists.get(k - 1).copied().unwrap_or(0.0)
        })
        .collect();

    let baseline_lrds: Vec<Option<f64>> = (0..baseline.len())
        .map(|i| lrd(baseline[i], Some(i), baseline, &k_distances, k))
        .collect();

    data.iter()
        .map(|&value| {
            let neighbors = nearest(value, None, baseline, k);
            let value_lrd = lrd(value, None, baseline, &k_distances, k);

            let neighbor_lrds: Vec<Option<f64>> =
                neighbors.iter().map(|&(i, _)| baseline_lrds[i]).collect();

            match value_lrd {
                // infinitely dense: the value coincides with a duplicated
                // neighborhood, nothing unusual about it
                None => 1.0,
                Some(own) => {
                    if neighbor_lrds.iter().any(|l| l.is_none()) {
                        // neighbors are infinitely dense but the value is not
                        return DEGENERATE_SCORE;
                    }
                    let neighbor_mean = neighbor_lrds
                        .iter()
                        .map(|l| l.unwrap_or(0.0))
                        .sum::<f64>()
                        / neighbor_lrds.len() as f64;
                    neighbor_mean / own
                }
            }
        })
        .collect()
}

/// k nearest baseline points as (index, distance), excluding `skip`.
fn nearest(value: f64, skip: Option<usize>, baseline: &[f64], k: usize) -> Vec<(usize, f64)> {
    let mut dists: Vec<(usize, f64)> = baseline
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != skip)
        .map(|(i, &v)| (i, (value - v).abs()))
        .collect();
    dists.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    dists.truncate(k);
    dists
}

/// Local reachability density; None encodes infinite density (all reach
/// distances zero).
fn lrd(
    value: f64,
    skip: Option<usize>,
    baseline: &[f64],
    k_distances: &[f64],
    k: usize,
) -> Option<f64> {
    let neighbors = nearest(value, skip, baseline, k);
    if neighbors.is_empty() {
        return Some(0.0);
    }
    let reach_sum: f64 = neighbors
        .iter()
        .map(|&(i, dist)| dist.max(k_distances[i]))
        .sum();
    if reach_sum == 0.0 {
        return None;
    }
    Some(neighbors.len() as f64 / reach_sum)
}
