//! Anomaly detection.
//!
//! Four strategies behind one dispatching [`AnomalyDetector`]: z-score
//! statistics, isolation forest, local outlier factor, and the variety-based
//! method that scores values against the viability model. Every strategy
//! classifies its findings into a severity and the detector derives a
//! description and recommendations from them.

mod detector;
mod isolation;
mod lof;
mod variety;

pub use detector::{AnomalyDetector, AnomalyOptions};
pub use isolation::{average_path_length, IsolationForest};
pub use lof::lof_scores;
pub use variety::{scalar_variety, sequence_variety, VsmBaseline};
