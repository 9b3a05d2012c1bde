//! Pairwise correlation analysis.
//!
//! [`CorrelationAnalyzer`] scores every input pair with a weighted blend of
//! correlation methods, extracts relationships above a threshold, and
//! optionally screens retained pairs for Granger-style causal direction.
//! Lead/lag structure is available on demand via [`find_optimal_lag`].

mod analyzer;
mod causal;
mod lag;

pub use analyzer::{
    multi_method_correlation, CorrelationAnalyzer, CorrelationOptions, SignalInput,
};
pub use causal::{granger_f_statistic, screen_causality};
pub use lag::{find_optimal_lag, LagProfile};
