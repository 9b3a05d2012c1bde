//! Buffered streaming pipeline around the temporal detector.

use std::collections::VecDeque;

use tracing::debug;

use crate::temporal::{TemporalDetector, TemporalOptions};
use crate::types::PatternAnalysis;

/// Incremental feed into pattern detection.
///
/// Samples accumulate until a full window is buffered; each emitted analysis
/// covers exactly one window, after which `slide_interval` samples are
/// dropped from the front.
#[derive(Clone, Debug)]
pub struct StreamProcessor {
    detector: TemporalDetector,
    options: TemporalOptions,
    buffer: VecDeque<f64>,
}

impl Default for StreamProcessor {
    fn default() -> Self {
        Self::new(TemporalOptions::default())
    }
}

impl StreamProcessor {
    pub fn new(options: TemporalOptions) -> Self {
        Self {
            // one-window analyses: the detector sees exactly window_size
            // samples per emission
            detector: TemporalDetector::with_options(options),
            options,
            buffer: VecDeque::new(),
        }
    }

    /// Buffered samples not yet analyzed.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Feed samples; returns one analysis per completed window.
    pub fn push(&mut self, samples: &[f64]) -> Vec<PatternAnalysis> {
        self.buffer.extend(samples);

        let mut emitted = Vec::new();
        while self.buffer.len() >= self.options.window_size {
            let window: Vec<f64> = self
                .buffer
                .iter()
                .take(self.options.window_size)
                .copied()
                .collect();
            emitted.push(self.detector.analyze(&window));
            self.buffer.drain(..self.options.slide_interval.max(1));
        }
        if !emitted.is_empty() {
            debug!(
                emitted = emitted.len(),
                buffered = self.buffer.len(),
                "stream windows analyzed"
            );
        }
        emitted
    }

    /// Analyze whatever remains in the buffer, regardless of window size,
    /// and clear it.
    pub fn flush(&mut self) -> Option<PatternAnalysis> {
        if self.buffer.is_empty() {
            return None;
        }
        let remaining: Vec<f64> = self.buffer.drain(..).collect();
        let detector = TemporalDetector::with_options(TemporalOptions {
            window_size: remaining.len(),
            slide_interval: remaining.len(),
        });
        Some(detector.analyze(&remaining))
    }

    /// Drop all buffered samples.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}
