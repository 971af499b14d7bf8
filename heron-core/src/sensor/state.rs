//! Per-node sensor state
//!
//! One [`SensorState`] exists for every registered node for the whole run.
//! It keeps the last corrected reading; frames that are not a valid reading
//! for this node leave it untouched, so a stale value is always the last
//! good one.

use heapless::{String, Vec};
use heron_protocol::{Frame, FrameType, SERVICE_READING};

use super::correction::correct_distance;
use super::range::RangeRecord;
use super::variant::{
    ChannelCalibration, SensorVariant, CHANNEL_COUNT, INFRARED, INVALID_DISTANCE, ULTRASOUND,
};
use crate::config::MAX_LABEL_LEN;

/// State of one EDUCAT sensor node
#[derive(Debug, Clone, PartialEq)]
pub struct SensorState {
    id: u8,
    name: String<MAX_LABEL_LEN>,
    variant: SensorVariant,
    distances: Vec<f32, CHANNEL_COUNT>,
    /// Calibration currently describing channel 0
    summary: ChannelCalibration,
}

impl SensorState {
    /// Register a node; no reading is known yet
    pub fn new(id: u8, name: String<MAX_LABEL_LEN>, variant: SensorVariant) -> Self {
        Self {
            id,
            name,
            variant,
            distances: Vec::new(),
            summary: variant.calibration_table()[0],
        }
    }

    /// Node id on the bus
    pub fn id(&self) -> u8 {
        self.id
    }

    /// Position label
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hardware variant
    pub fn variant(&self) -> SensorVariant {
        self.variant
    }

    /// Apply a message addressed to this node
    ///
    /// Only data frames of the reading service with the variant's exact
    /// payload length are used. Returns whether the distances changed.
    pub fn decode_reading(&mut self, frame_type: FrameType, service_id: u32, payload: &[u8]) -> bool {
        if frame_type != FrameType::Data || service_id != SERVICE_READING {
            return false;
        }
        let Some(mut channels) = self.variant.extract(payload) else {
            return false;
        };

        correct_distance(self.variant, &mut channels);
        self.distances.clear();
        // Capacity is CHANNEL_COUNT
        let _ = self.distances.extend_from_slice(&channels);

        if self.variant == SensorVariant::InfraredUltrasonic {
            self.update_infos_node();
        }
        true
    }

    /// Apply a decoded frame addressed to this node
    pub fn handle_frame(&mut self, frame: &Frame) -> bool {
        self.decode_reading(frame.frame_type, frame.service_id(), &frame.payload)
    }

    /// Point the summary metadata at whichever beam produced channel 0
    fn update_infos_node(&mut self) {
        let nearest = self.distances[0];
        if nearest == INVALID_DISTANCE {
            return;
        }
        if nearest == self.distances[1] {
            self.summary = ULTRASOUND;
        } else if self.distances[2..].contains(&nearest) {
            self.summary = INFRARED;
        }
    }

    /// Last corrected reading, empty until the first one arrives
    ///
    /// Channel 0 is the nearest obstacle, channels 1.. the beams.
    pub fn distances(&self) -> &[f32] {
        &self.distances
    }

    /// Nearest obstacle, if any beam saw one
    pub fn nearest(&self) -> Option<f32> {
        self.distances
            .first()
            .copied()
            .filter(|d| *d != INVALID_DISTANCE)
    }

    /// Calibration currently describing channel 0
    pub fn summary(&self) -> &ChannelCalibration {
        &self.summary
    }

    /// Calibration describing a channel of the current reading
    pub fn calibration(&self, channel: usize) -> Option<ChannelCalibration> {
        match channel {
            0 => Some(self.summary),
            _ => self.variant.calibration(channel).copied(),
        }
    }

    /// One record per channel of the last reading, for publishing
    pub fn ranges(&self) -> impl Iterator<Item = RangeRecord> + '_ {
        self.distances
            .iter()
            .enumerate()
            .filter_map(move |(channel, range)| {
                Some(RangeRecord {
                    node_id: self.id,
                    label: self.name.clone(),
                    channel: channel as u8,
                    calibration: self.calibration(channel)?,
                    range: *range,
                })
            })
    }
}
