//! Error types for the pattern engine.
//!
//! This module defines the unified error type used across the engine crates:
//!
//! - [`EngineError`]: top-level unified error
//! - Sub-error types: [`AnalysisError`], [`StoreError`], [`ConfigError`]
//!
//! Analyzers themselves degrade gracefully on degenerate input (empty
//! sequences, zero variance) by returning "no pattern" or identity values;
//! errors are reserved for genuinely failed operations: transport failures,
//! invalid configuration, and coordinator channel breakdown.

use thiserror::Error;

// ============================================================================
// SUB-ERRORS
// ============================================================================

/// Errors from a specific analysis request.
///
/// These are surfaced per-record where possible; the overall call still
/// succeeds when only individual records are affected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnalysisError {
    /// Input sequence was empty where at least one value is required.
    #[error("empty input sequence")]
    EmptyInput,

    /// Input shorter than the minimum the analysis needs.
    #[error("insufficient data: need at least {required}, got {actual}")]
    InsufficientData {
        /// Minimum number of samples required
        required: usize,
        /// Samples actually provided
        actual: usize,
    },

    /// A non-finite value (NaN or infinity) was found in the input.
    #[error("non-finite value at index {index}")]
    NonFinite {
        /// Index of the offending sample
        index: usize,
    },
}

/// Errors from the vector-store adapter.
///
/// Transport failures are typed and never panic; the coordinator logs them
/// and drops the persist step while preserving the in-memory result.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Request exceeded the configured timeout.
    #[error("store request timed out after {elapsed_ms}ms")]
    Timeout {
        /// Milliseconds waited before giving up
        elapsed_ms: u64,
    },

    /// Connection-level failure (refused, reset, DNS).
    #[error("store connection failed: {0}")]
    Connection(String),

    /// Non-2xx HTTP response.
    #[error("store returned status {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// Payload could not be serialized or a response could not be parsed.
    #[error("store serialization error: {0}")]
    Serialization(String),

    /// The store reported itself unhealthy.
    #[error("store unhealthy: {0}")]
    Unhealthy(String),
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A configuration value was outside its allowed range.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Configuration field name
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// A required configuration value was missing.
    #[error("missing configuration: {0}")]
    Missing(&'static str),
}

// ============================================================================
// UNIFIED ERROR
// ============================================================================

/// Top-level unified error type for the pattern engine.
///
/// All crate errors convert into this type via `From` implementations so the
/// coordinator can return a single error surface to callers.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Analysis-level error.
    #[error("analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// Vector-store adapter error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid input from a caller.
    #[error("validation error: {0}")]
    Validation(String),

    /// Internal error indicating a bug or system failure, such as the
    /// coordinator loop having shut down while callers are still active.
    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Check if this error is recoverable via retry.
    ///
    /// Transport timeouts and connection failures can succeed on retry;
    /// validation, configuration, and internal errors cannot.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Store(StoreError::Timeout { .. }) | Self::Store(StoreError::Connection(_))
        )
    }

    /// Create an internal error from a message.
    #[inline]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a validation error from a message.
    #[inline]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Result type alias for engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
