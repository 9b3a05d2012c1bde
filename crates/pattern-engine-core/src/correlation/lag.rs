//! Lead/lag search over shifted correlations.

use serde::{Deserialize, Serialize};

use crate::numeric::pearson;

/// Mapping lag → correlation with the located optimum.
///
/// A positive lag means the first series leads: its value at t aligns with
/// the second series' value at t + lag.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct LagProfile {
    pub lags: Vec<i64>,
    pub correlations: Vec<f64>,
    /// Lag with the largest |correlation|.
    pub optimal_lag: i64,
    pub optimal_correlation: f64,
}

/// Correlate two series across lags in [-max_lag, +max_lag].
///
/// `max_lag` is a quarter of the shorter length. Degenerate inputs produce
/// an empty profile with optimum at lag 0.
pub fn find_optimal_lag(a: &[f64], b: &[f64]) -> LagProfile {
    let n = a.len().min(b.len());
    let max_lag = (n / 4) as i64;
    if n == 0 {
        return LagProfile::default();
    }

    let mut profile = LagProfile::default();
    for lag in -max_lag..=max_lag {
        let r = correlation_at_lag(&a[..n], &b[..n], lag);
        if r.abs() > profile.optimal_correlation.abs() {
            profile.optimal_lag = lag;
            profile.optimal_correlation = r;
        }
        profile.lags.push(lag);
        profile.correlations.push(r);
    }
    profile
}

fn correlation_at_lag(a: &[f64], b: &[f64], lag: i64) -> f64 {
    let n = a.len();
    let shift = lag.unsigned_abs() as usize;
    if shift >= n {
        return 0.0;
    }
    if lag >= 0 {
        pearson(&a[..n - shift], &b[shift..])
    } else {
        pearson(&a[shift..], &b[..n - shift])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_lag_for_identical_series() {
        let x: Vec<f64> = (0..40).map(|i| (i as f64 * 0.7).sin()).collect();
        let profile = find_optimal_lag(&x, &x);
        assert_eq!(profile.optimal_lag, 0);
        assert!((profile.optimal_correlation - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_positive_lag_when_first_leads() {
        // b[t] = a[t - 3]: a leads b by 3
        let a: Vec<f64> = (0..60).map(|i| (i as f64 * 0.9).sin()).collect();
        let b: Vec<f64> = (0..60)
            .map(|i| {
                if i >= 3 {
                    a[i - 3]
                } else {
                    0.0
                }
            })
            .collect();
        let profile = find_optimal_lag(&a, &b);
        assert_eq!(profile.optimal_lag, 3);
        assert!(profile.optimal_correlation > 0.9);
    }

    #[test]
    fn test_negative_lag_when_second_leads() {
        let b: Vec<f64> = (0..60).map(|i| (i as f64 * 0.9).sin()).collect();
        let a: Vec<f64> = (0..60)
            .map(|i| {
                if i >= 3 {
                    b[i - 3]
                } else {
                    0.0
                }
            })
            .collect();
        let profile = find_optimal_lag(&a, &b);
        assert_eq!(profile.optimal_lag, -3);
    }

    #[test]
    fn test_profile_covers_symmetric_range() {
        let x: Vec<f64> = (0..40).map(|i| i as f64).collect();
        let profile = find_optimal_lag(&x, &x);
        assert_eq!(profile.lags.first(), Some(&-10));
        assert_eq!(profile.lags.last(), Some(&10));
        assert_eq!(profile.lags.len(), profile.correlations.len());
    }

    #[test]
    fn test_empty_input() {
        let profile = find_optimal_lag(&[], &[]);
        assert!(profile.lags.is_empty());
        assert_eq!(profile.optimal_lag, 0);
    }
}
