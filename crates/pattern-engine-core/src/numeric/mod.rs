//! Numeric primitives.
//!
//! Pure functions over finite-length sequences of finite reals. Degenerate
//! inputs (empty, too short, zero variance) return identity values (0 for
//! correlations and entropies) deterministically instead of erroring.

mod correlate;
mod regression;
mod stats;

pub use correlate::{
    autocorrelation, histogram_entropy, kendall, mutual_information, pearson, spearman,
};
pub use regression::{linear_regression, solve_least_squares, LinearFit};
pub use stats::{interquartile_range, mean, midranks, population_variance, quartiles, std_dev};
