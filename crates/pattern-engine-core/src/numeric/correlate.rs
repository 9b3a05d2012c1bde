//! Pairwise association measures: Pearson, Spearman, Kendall, mutual
//! information, and autocorrelation.

use super::stats::{mean, midranks, std_dev};

/// Number of histogram bins used for entropy estimation.
const ENTROPY_BINS: usize = 10;

/// Minimum samples before mutual information is attempted.
const MI_MIN_SAMPLES: usize = 10;

/// Pearson product-moment correlation.
///
/// Inputs are aligned to the shorter length. Returns 0 when fewer than two
/// aligned samples remain or when either series has zero standard deviation.
/// Uses population standard deviations.
pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return 0.0;
    }
    let a = &a[..n];
    let b = &b[..n];

    let mean_a = mean(a);
    let mean_b = mean(b);
    let std_a = std_dev(a);
    let std_b = std_dev(b);
    if std_a == 0.0 || std_b == 0.0 {
        return 0.0;
    }

    let covariance = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x - mean_a) * (y - mean_b))
        .sum::<f64>()
        / n as f64;

    (covariance / (std_a * std_b)).clamp(-1.0, 1.0)
}

/// Spearman rank correlation: Pearson over midranks.
pub fn spearman(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return 0.0;
    }
    let ranks_a = midranks(&a[..n]);
    let ranks_b = midranks(&b[..n]);
    pearson(&ranks_a, &ranks_b)
}

/// Kendall sign-concordance correlation.
///
/// Over all pairs i < j, compares the signs of (a_j - a_i) and (b_j - b_i).
/// A tie in either dimension counts as discordant; the denominator is the
/// total pair count.
pub fn kendall(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return 0.0;
    }

    let mut concordant = 0i64;
    let mut discordant = 0i64;
    for i in 0..n {
        for j in (i + 1)..n {
            let da = a[j] - a[i];
            let db = b[j] - b[i];
            if da * db > 0.0 {
                concordant += 1;
            } else {
                discordant += 1;
            }
        }
    }

    let total = (n * (n - 1) / 2) as f64;
    ((concordant - discordant) as f64 / total).clamp(-1.0, 1.0)
}

/// Shannon entropy (nats) of a 10-bin histogram over the value range.
///
/// Returns 0 when the range collapses (zero bin width) or the input is empty.
pub fn histogram_entropy(values: &[f64]) -> f64 {
    bin_indices(values)
        .map(|bins| {
            let mut counts = [0usize; ENTROPY_BINS];
            for bin in bins {
                counts[bin] += 1;
            }
            entropy_from_counts(&counts, values.len())
        })
        .unwrap_or(0.0)
}

/// Histogram mutual information between two series.
///
/// MI = H(A) + H(B) - H(A,B) over 10-bin marginal and joint histograms.
/// When `normalized`, the result is MI / min(H(A), H(B)), clamped to [0, 1].
/// Returns 0 when fewer than 10 aligned samples or a zero bin width.
pub fn mutual_information(a: &[f64], b: &[f64], normalized: bool) -> f64 {
    let n = a.len().min(b.len());
    if n < MI_MIN_SAMPLES {
        return 0.0;
    }
    let a = &a[..n];
    let b = &b[..n];

    let (bins_a, bins_b) = match (bin_indices(a), bin_indices(b)) {
        (Some(x), Some(y)) => (x, y),
        _ => return 0.0,
    };

    let mut counts_a = [0usize; ENTROPY_BINS];
    let mut counts_b = [0usize; ENTROPY_BINS];
    let mut joint = [[0usize; ENTROPY_BINS]; ENTROPY_BINS];
    for (bin_a, bin_b) in bins_a.zip(bins_b) {
        counts_a[bin_a] += 1;
        counts_b[bin_b] += 1;
        joint[bin_a][bin_b] += 1;
    }

    let h_a = entropy_from_counts(&counts_a, n);
    let h_b = entropy_from_counts(&counts_b, n);
    let mut h_joint = 0.0;
    for row in &joint {
        for &count in row {
            if count > 0 {
                let p = count as f64 / n as f64;
                h_joint -= p * p.ln();
            }
        }
    }

    let mi = (h_a + h_b - h_joint).max(0.0);
    if !normalized {
        return mi;
    }

    let max_mi = h_a.min(h_b);
    if max_mi == 0.0 {
        return 0.0;
    }
    (mi / max_mi).clamp(0.0, 1.0)
}

/// Autocorrelation for lags 0..=n/2.
///
/// Each lag correlates the series against itself shifted by the lag.
pub fn autocorrelation(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    (0..=n / 2)
        .map(|lag| pearson(&values[..n - lag], &values[lag..]))
        .collect()
}

/// Map values into 10 equal-width bins over [min, max].
///
/// None when the range collapses to a point.
fn bin_indices(values: &[f64]) -> Option<impl Iterator<Item = usize> + '_> {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let width = (max - min) / ENTROPY_BINS as f64;
    if !width.is_finite() || width == 0.0 {
        return None;
    }
    Some(values.iter().map(move |&v| {
        (((v - min) / width) as usize).min(ENTROPY_BINS - 1)
    }))
}

fn entropy_from_counts(counts: &[usize], total: usize) -> f64 {
    counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / total as f64;
            -p * p.ln()
        })
        .sum()
}
