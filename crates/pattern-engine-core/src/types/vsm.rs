//! Viability model state.
//!
//! Five nested control levels, an environment estimate, and the algedonic
//! channel reserved for critical viability threats. The coordinator owns the
//! single mutable instance; detectors only read derived baselines from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of recursion levels in the model.
pub const LEVEL_COUNT: usize = 5;

/// One control level: its current variety and its handling capacity.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct LevelState {
    pub variety: f64,
    pub capacity: f64,
}

/// Estimated environmental pressure on the system.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct EnvironmentState {
    pub variety: f64,
    /// Uncertainty of the estimate in [0, 1].
    pub uncertainty: f64,
}

/// Out-of-band alert channel for critical viability threats.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct AlgedonicChannel {
    pub active: bool,
    /// Description of the last signal raised.
    pub last_signal: Option<String>,
    pub last_timestamp: Option<DateTime<Utc>>,
}

impl AlgedonicChannel {
    /// Activate the channel with a signal description.
    pub fn raise(&mut self, signal: impl Into<String>) {
        self.active = true;
        self.last_signal = Some(signal.into());
        self.last_timestamp = Some(Utc::now());
    }
}

/// Full viability-model state.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct VsmState {
    /// Control levels, innermost first.
    pub levels: [LevelState; LEVEL_COUNT],
    pub environment: EnvironmentState,
    pub algedonic_channel: AlgedonicChannel,
}

impl Default for VsmState {
    fn default() -> Self {
        let varieties = [100.0, 80.0, 60.0, 40.0, 20.0];
        let capacities = [150.0, 120.0, 100.0, 80.0, 50.0];
        let mut levels = [LevelState {
            variety: 0.0,
            capacity: 0.0,
        }; LEVEL_COUNT];
        for (level, (&variety, &capacity)) in
            levels.iter_mut().zip(varieties.iter().zip(&capacities))
        {
            level.variety = variety;
            level.capacity = capacity;
        }
        Self {
            levels,
            environment: EnvironmentState {
                variety: 200.0,
                uncertainty: 0.3,
            },
            algedonic_channel: AlgedonicChannel::default(),
        }
    }
}

impl VsmState {
    /// Sum of variety across all control levels.
    pub fn total_variety(&self) -> f64 {
        self.levels.iter().map(|l| l.variety).sum()
    }

    /// System variety relative to environmental variety.
    ///
    /// Requisite variety holds when this is at least 1.
    pub fn variety_ratio(&self) -> f64 {
        if self.environment.variety == 0.0 {
            return 0.0;
        }
        self.total_variety() / self.environment.variety
    }

    /// Level varieties as a plain sequence, the baseline the vsm detection
    /// method derives its expectations from when no explicit baseline is
    /// supplied.
    pub fn level_varieties(&self) -> Vec<f64> {
        self.levels.iter().map(|l| l.variety).collect()
    }
}

/// Viability verdict returned alongside every anomaly detection.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Viability {
    /// Requisite variety holds and nothing critical was found.
    pub viable: bool,
    pub variety_ratio: f64,
    pub recommendations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_matches_initial_model() {
        let state = VsmState::default();
        assert_eq!(state.levels[0].variety, 100.0);
        assert_eq!(state.levels[4].variety, 20.0);
        assert_eq!(state.levels[0].capacity, 150.0);
        assert_eq!(state.levels[4].capacity, 50.0);
        assert_eq!(state.environment.variety, 200.0);
        assert!((state.environment.uncertainty - 0.3).abs() < f64::EPSILON);
        assert!(!state.algedonic_channel.active);
    }

    #[test]
    fn test_variety_ratio_initial() {
        let state = VsmState::default();
        assert_eq!(state.total_variety(), 300.0);
        assert!((state.variety_ratio() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_variety_ratio_zero_environment() {
        let mut state = VsmState::default();
        state.environment.variety = 0.0;
        assert_eq!(state.variety_ratio(), 0.0);
    }

    #[test]
    fn test_algedonic_raise() {
        let mut channel = AlgedonicChannel::default();
        assert!(!channel.active);
        channel.raise("critical anomaly anom_0000000000000000");
        assert!(channel.active);
        assert!(channel.last_signal.as_deref().unwrap().contains("anom_"));
        assert!(channel.last_timestamp.is_some());
    }

    #[test]
    fn test_level_varieties_order() {
        let state = VsmState::default();
        assert_eq!(
            state.level_varieties(),
            vec![100.0, 80.0, 60.0, 40.0, 20.0]
        );
    }

    #[test]
    fn test_state_serialization_round_trip() {
        let state = VsmState::default();
        let json = serde_json::to_string(&state).expect("serialize");
        let back: VsmState = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, state);
    }
}
