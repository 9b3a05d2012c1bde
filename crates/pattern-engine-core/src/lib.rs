//! Pattern Engine Core Library
//!
//! Provides the domain types, numeric primitives, and detectors for the
//! time-series pattern engine:
//!
//! - Domain types (`PatternAnalysis`, `AnomalyReport`, `CorrelationAnalysis`,
//!   `VsmState`, vector-store documents)
//! - Numeric primitives (correlation, entropy, regression, autocorrelation)
//! - Temporal pattern detection over sliding windows
//! - Multi-method correlation analysis with lag search and causal screening
//! - Anomaly detection (statistical, isolation forest, LOF, variety-based)
//! - Core traits (`VectorStore`, `TelemetrySink`) and in-memory stubs
//!
//! Detectors are stateless values and may be invoked concurrently by
//! independent callers; all engine state lives in `pattern-engine-runtime`.

pub mod anomaly;
pub mod config;
pub mod correlation;
pub mod error;
pub mod ident;
pub mod numeric;
pub mod stream;
pub mod stubs;
pub mod temporal;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use ident::IdPrefix;
