//! Pattern Engine Runtime
//!
//! The coordinating half of the engine: a serial actor owning all mutable
//! state, a scheduler tick that pulls recent data through the detection
//! pipeline, and the telemetry sinks. Detection itself lives in
//! `pattern-engine-core`; persistence in `pattern-engine-storage`.

pub mod engine;
pub mod telemetry;

pub use engine::{EngineHandle, PatternEngine, SystemState};
pub use telemetry::{RecordingTelemetry, TracingTelemetry};
