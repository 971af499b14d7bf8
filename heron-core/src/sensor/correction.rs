//! Distance correction
//!
//! Turns raw beam distances into reported ones: zero readings become
//! [`INVALID_DISTANCE`], the rest are clamped into the beam's range, and
//! channel 0 is recomputed as the nearest valid beam.

use super::variant::{SensorVariant, CHANNEL_COUNT, INVALID_DISTANCE};

/// Correct a raw reading in place
pub fn correct_distance(variant: SensorVariant, channels: &mut [f32; CHANNEL_COUNT]) {
    let table = variant.calibration_table();

    for (distance, calibration) in channels.iter_mut().zip(table.iter()).skip(1) {
        *distance = if *distance == 0.0 {
            INVALID_DISTANCE
        } else {
            calibration.clamp(*distance)
        };
    }

    channels[0] = nearest(&channels[1..]).unwrap_or(INVALID_DISTANCE);
}

/// First minimum among valid distances
fn nearest(distances: &[f32]) -> Option<f32> {
    distances
        .iter()
        .copied()
        .filter(|d| *d != INVALID_DISTANCE)
        .fold(None, |best, d| match best {
            Some(b) if b <= d => Some(b),
            _ => Some(d),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_beams_are_invalid() {
        let mut channels = [0.0, 0.0, 0.4, 0.0, 0.9];
        correct_distance(SensorVariant::Infrared, &mut channels);
        assert_eq!(channels, [0.4, -1.0, 0.4, -1.0, 0.9]);
    }

    #[test]
    fn test_all_invalid_summary() {
        let mut channels = [1.2, 0.0, 0.0, 0.0, 0.0];
        correct_distance(SensorVariant::Infrared, &mut channels);
        assert_eq!(channels, [-1.0; CHANNEL_COUNT]);
    }

    #[test]
    fn test_clamping_per_channel() {
        // Ultrasound beam keeps 3 m, infrared beams cap at 1.5 m
        let mut channels = [0.0, 3.0, 2.0, 0.01, 1.0];
        correct_distance(SensorVariant::InfraredUltrasonic, &mut channels);
        assert_eq!(channels, [0.05, 3.0, 1.5, 0.05, 1.0]);
    }

    #[test]
    fn test_summary_ignores_node_value() {
        let mut channels = [0.01, 0.7, 0.6, 0.8, 0.9];
        correct_distance(SensorVariant::Infrared, &mut channels);
        assert_eq!(channels[0], 0.6);
    }

    #[test]
    fn test_nearest_tie_keeps_first() {
        assert_eq!(nearest(&[0.5, 0.3, 0.3, -1.0]), Some(0.3));
        assert_eq!(nearest(&[-1.0, -1.0]), None);
    }

    proptest! {
        #[test]
        fn prop_summary_is_min_of_valid(raw in proptest::array::uniform4(0u8..=255)) {
            let mut channels = [0.0f32; CHANNEL_COUNT];
            for (slot, value) in channels[1..].iter_mut().zip(raw.iter()) {
                *slot = *value as f32 / 100.0;
            }
            correct_distance(SensorVariant::Infrared, &mut channels);

            for beam in &channels[1..] {
                prop_assert!(*beam == INVALID_DISTANCE || (0.05f32..=1.5f32).contains(beam));
                if *beam != INVALID_DISTANCE {
                    prop_assert!(channels[0] <= *beam);
                }
            }
            let any_valid = raw.iter().any(|r| *r != 0);
            prop_assert_eq!(channels[0] == INVALID_DISTANCE, !any_valid);
        }
    }
}
