//! EDUCAT sensor variants and calibration tables
//!
//! Both variants report five channels. Channel 0 is the nearest obstacle
//! derived from the others; channels 1..4 are individual beams.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Channels reported by every sensor variant
pub const CHANNEL_COUNT: usize = 5;

/// Distance reported for a beam that saw nothing
pub const INVALID_DISTANCE: f32 = -1.0;

/// Kind of emitter behind a channel
///
/// Numbered like `sensor_msgs/Range` so records can be forwarded as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum RadiationType {
    Ultrasound = 0,
    Infrared = 1,
}

/// Static properties of one channel
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelCalibration {
    /// Emitter type
    pub radiation_type: RadiationType,
    /// Beam aperture in radians
    pub field_of_view: f32,
    /// Closest measurable distance in meters
    pub min_range: f32,
    /// Farthest measurable distance in meters
    pub max_range: f32,
}

impl ChannelCalibration {
    /// Clamp a distance into this channel's measurable range
    pub fn clamp(&self, distance: f32) -> f32 {
        distance.clamp(self.min_range, self.max_range)
    }
}

/// Infrared beam (Sharp GP2Y0A-class, 5-150 cm)
pub const INFRARED: ChannelCalibration = ChannelCalibration {
    radiation_type: RadiationType::Infrared,
    field_of_view: 0.0873,
    min_range: 0.05,
    max_range: 1.5,
};

/// Ultrasound beam (2-400 cm, ~15° cone)
pub const ULTRASOUND: ChannelCalibration = ChannelCalibration {
    radiation_type: RadiationType::Ultrasound,
    field_of_view: 0.2618,
    min_range: 0.02,
    max_range: 4.0,
};

const INFRARED_TABLE: [ChannelCalibration; CHANNEL_COUNT] = [INFRARED; CHANNEL_COUNT];

const INFRARED_ULTRASONIC_TABLE: [ChannelCalibration; CHANNEL_COUNT] =
    [ULTRASOUND, ULTRASOUND, INFRARED, INFRARED, INFRARED];

/// Sensor node hardware variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SensorVariant {
    /// Four infrared beams
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "ir"))]
    Infrared,
    /// One ultrasound beam and three infrared beams
    #[cfg_attr(feature = "serde", serde(alias = "irus"))]
    InfraredUltrasonic,
}

impl SensorVariant {
    /// Number of reported channels, summary included
    pub const fn channel_count(self) -> usize {
        CHANNEL_COUNT
    }

    /// Payload length of a reading message
    pub const fn reading_len(self) -> usize {
        match self {
            SensorVariant::Infrared => 6,
            SensorVariant::InfraredUltrasonic => 7,
        }
    }

    /// Calibration of every channel
    ///
    /// Entry 0 is the initial summary calibration; sensors track the live
    /// one themselves.
    pub const fn calibration_table(self) -> &'static [ChannelCalibration; CHANNEL_COUNT] {
        match self {
            SensorVariant::Infrared => &INFRARED_TABLE,
            SensorVariant::InfraredUltrasonic => &INFRARED_ULTRASONIC_TABLE,
        }
    }

    /// Calibration of a single channel
    pub fn calibration(self, channel: usize) -> Option<&'static ChannelCalibration> {
        self.calibration_table().get(channel)
    }

    /// Extract raw distances in meters from a reading payload
    ///
    /// Returns `None` unless the payload has exactly [`reading_len`] bytes.
    /// Channel 0 holds the node's own summary, which correction replaces.
    ///
    /// [`reading_len`]: SensorVariant::reading_len
    pub fn extract(self, payload: &[u8]) -> Option<[f32; CHANNEL_COUNT]> {
        if payload.len() != self.reading_len() {
            return None;
        }

        let word = |at: usize| centimeters(u16::from_be_bytes([payload[at], payload[at + 1]]));
        let byte = |at: usize| centimeters(payload[at] as u16);

        let channels = match self {
            // Beams 2 and 3 are cross-wired on the node: bytes 3 and 4 swap
            SensorVariant::Infrared => [word(0), byte(2), byte(4), byte(3), byte(5)],
            SensorVariant::InfraredUltrasonic => [word(0), word(2), byte(4), byte(5), byte(6)],
        };
        Some(channels)
    }
}

/// Nodes report centimeters
fn centimeters(raw: u16) -> f32 {
    raw as f32 / 100.0
}
