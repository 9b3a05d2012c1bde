//! Pattern Engine Storage
//!
//! The vector-store boundary of the engine:
//!
//! - [`HashingEncoder`]: feature extraction with modulo feature hashing and
//!   L2 normalization into fixed-dimension vectors
//! - [`HttpVectorStore`]: JSON-over-HTTP adapter implementing the core
//!   `VectorStore` trait with per-request timeouts and typed errors

pub mod client;
pub mod encoder;

pub use client::HttpVectorStore;
pub use encoder::{
    anomaly_document, correlation_document, pattern_document, HashingEncoder,
};
