//! Burst detection against a mean + 2·std threshold.

use crate::numeric::{mean, std_dev};
use crate::types::{BurstInstance, TemporalPattern};

/// Detect transient spikes over the window.
///
/// Every sample above mean + 2·std is a burst instance whose magnitude is
/// its excess over the mean. Total strength is the summed magnitude relative
/// to the summed absolute signal, clamped to 1.
pub fn detect_bursts(window: &[f64]) -> Option<TemporalPattern> {
    if window.is_empty() {
        return None;
    }

    let window_mean = mean(window);
    let threshold = window_mean + 2.0 * std_dev(window);

    let instances: Vec<BurstInstance> = window
        .iter()
        .enumerate()
        .filter(|(_, &value)| value > threshold)
        .map(|(index, &value)| BurstInstance {
            index,
            magnitude: value - window_mean,
        })
        .collect();
    if instances.is_empty() {
        return None;
    }

    let total_magnitude: f64 = instances.iter().map(|b| b.magnitude).sum();
    let signal_magnitude: f64 = window.iter().map(|v| v.abs()).sum();
    let strength = if signal_magnitude == 0.0 {
        0.0
    } else {
        (total_magnitude / signal_magnitude).min(1.0)
    };

    let count = instances.len();
    let average_magnitude = total_magnitude / count as f64;
    Some(TemporalPattern::Burst {
        instances,
        strength,
        count,
        average_magnitude,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_spike() {
        let mut data = vec![1.0; 50];
        data[20] = 30.0;
        match detect_bursts(&data).expect("burst") {
            TemporalPattern::Burst {
                instances,
                count,
                strength,
                average_magnitude,
            } => {
                assert_eq!(count, 1);
                assert_eq!(instances[0].index, 20);
                assert!(instances[0].magnitude > 25.0);
                assert!(strength > 0.0 && strength <= 1.0);
                assert!((average_magnitude - instances[0].magnitude).abs() < 1e-12);
            }
            other => panic!("expected burst, got {other:?}"),
        }
    }

    #[test]
    fn test_constant_input_has_no_bursts() {
        // zero std: nothing exceeds the mean
        assert!(detect_bursts(&vec![4.0; 30]).is_none());
    }

    #[test]
    fn test_smooth_sine_has_no_bursts() {
        let data: Vec<f64> = (0..100)
            .map(|i| (std::f64::consts::TAU * i as f64 / 10.0).sin())
            .collect();
        // sine peak (1.0) stays under mean + 2·std (~1.41)
        assert!(detect_bursts(&data).is_none());
    }

    #[test]
    fn test_strength_clamped() {
        let mut data = vec![0.001; 20];
        data[5] = 1000.0;
        match detect_bursts(&data).expect("burst") {
            TemporalPattern::Burst { strength, .. } => {
                assert!(strength <= 1.0);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(detect_bursts(&[]).is_none());
    }
}
