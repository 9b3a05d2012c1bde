//! Ordinary least squares: simple regression and a small normal-equations
//! solver for lagged models.

/// Result of a simple linear regression.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LinearFit {
    /// Slope of the fitted line.
    pub slope: f64,
    /// Intercept of the fitted line.
    pub intercept: f64,
    /// Coefficient of determination in [0, 1].
    pub r_squared: f64,
}

/// Ordinary least squares over paired observations.
///
/// Inputs are aligned to the shorter length. Fewer than two samples, or an
/// x-series with zero spread, yields the zero fit.
pub fn linear_regression(xs: &[f64], ys: &[f64]) -> LinearFit {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return LinearFit::default();
    }
    let xs = &xs[..n];
    let ys = &ys[..n];

    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        sxx += (x - mean_x) * (x - mean_x);
        sxy += (x - mean_x) * (y - mean_y);
    }
    if sxx == 0.0 {
        return LinearFit::default();
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let ss_tot: f64 = ys.iter().map(|y| (y - mean_y) * (y - mean_y)).sum();
    let r_squared = if ss_tot == 0.0 {
        0.0
    } else {
        let ss_res: f64 = xs
            .iter()
            .zip(ys)
            .map(|(x, y)| {
                let predicted = slope * x + intercept;
                (y - predicted) * (y - predicted)
            })
            .sum();
        (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
    };

    LinearFit {
        slope,
        intercept,
        r_squared,
    }
}

/// Solve min ||Xb - y|| via the normal equations with Gaussian elimination.
///
/// `rows` holds one predictor row per observation (an intercept column must
/// be included by the caller). Returns None when the system is singular or
/// the shapes disagree.
pub fn solve_least_squares(rows: &[Vec<f64>], y: &[f64]) -> Option<Vec<f64>> {
    let n = rows.len();
    if n == 0 || n != y.len() {
        return None;
    }
    let k = rows[0].len();
    if k == 0 || n < k || rows.iter().any(|r| r.len() != k) {
        return None;
    }

    // X'X and X'y
    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for (row, &target) in rows.iter().zip(y) {
        for i in 0..k {
            xty[i] += row[i] * target;
            for j in 0..k {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }

    // Gaussian elimination with partial pivoting
    for col in 0..k {
        let pivot_row = (col..k)
            .max_by(|&a, &b| {
                xtx[a][col]
                    .abs()
                    .partial_cmp(&xtx[b][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);
        if xtx[pivot_row][col].abs() < 1e-12 {
            return None;
        }
        xtx.swap(col, pivot_row);
        xty.swap(col, pivot_row);

        for row in (col + 1)..k {
            let factor = xtx[row][col] / xtx[col][col];
            for j in col..k {
                xtx[row][j] -= factor * xtx[col][j];
            }
            xty[row] -= factor * xty[col];
        }
    }

    // back substitution
    let mut coefficients = vec![0.0; k];
    for row in (0..k).rev() {
        let mut acc = xty[row];
        for col in (row + 1)..k {
            acc -= xtx[row][col] * coefficients[col];
        }
        coefficients[row] = acc / xtx[row][row];
    }
    Some(coefficients)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-8;

    #[test]
    fn test_exact_line() {
        let xs: Vec<f64> = (0..50).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x + 1.0).collect();
        let fit = linear_regression(&xs, &ys);
        assert!((fit.slope - 2.0).abs() < EPS);
        assert!((fit.intercept - 1.0).abs() < EPS);
        assert!((fit.r_squared - 1.0).abs() < EPS);
    }

    #[test]
    fn test_flat_line_r_squared_zero() {
        let xs: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let ys = vec![5.0; 20];
        let fit = linear_regression(&xs, &ys);
        assert!(fit.slope.abs() < EPS);
        assert_eq!(fit.r_squared, 0.0);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(linear_regression(&[], &[]), LinearFit::default());
        assert_eq!(linear_regression(&[1.0], &[2.0]), LinearFit::default());
        // zero x-spread
        assert_eq!(
            linear_regression(&[3.0, 3.0], &[1.0, 2.0]),
            LinearFit::default()
        );
    }

    #[test]
    fn test_noisy_fit_r_squared_below_one() {
        let xs: Vec<f64> = (0..40).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs
            .iter()
            .enumerate()
            .map(|(i, x)| 3.0 * x + if i % 2 == 0 { 4.0 } else { -4.0 })
            .collect();
        let fit = linear_regression(&xs, &ys);
        assert!(fit.slope > 2.5 && fit.slope < 3.5);
        assert!(fit.r_squared < 1.0);
        assert!(fit.r_squared > 0.9);
    }

    #[test]
    fn test_least_squares_recovers_coefficients() {
        // y = 1 + 2a + 3b
        let rows: Vec<Vec<f64>> = (0..30)
            .map(|i| {
                let a = (i as f64 * 0.7).sin();
                let b = (i as f64 * 0.3).cos();
                vec![1.0, a, b]
            })
            .collect();
        let y: Vec<f64> = rows.iter().map(|r| 1.0 + 2.0 * r[1] + 3.0 * r[2]).collect();
        let beta = solve_least_squares(&rows, &y).expect("solvable");
        assert!((beta[0] - 1.0).abs() < 1e-6);
        assert!((beta[1] - 2.0).abs() < 1e-6);
        assert!((beta[2] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_least_squares_singular_returns_none() {
        // duplicated column makes X'X singular
        let rows: Vec<Vec<f64>> = (0..10)
            .map(|i| vec![1.0, i as f64, i as f64])
            .collect();
        let y: Vec<f64> = (0..10).map(|i| i as f64).collect();
        assert!(solve_least_squares(&rows, &y).is_none());
    }

    #[test]
    fn test_least_squares_shape_mismatch() {
        assert!(solve_least_squares(&[], &[]).is_none());
        assert!(solve_least_squares(&[vec![1.0, 2.0]], &[1.0, 2.0]).is_none());
    }
}
