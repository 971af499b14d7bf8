//! Range records handed to the publishing side

use heapless::String;

use super::variant::{ChannelCalibration, INVALID_DISTANCE};
use crate::config::MAX_LABEL_LEN;

/// One channel of one sensor, shaped like a `sensor_msgs/Range`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RangeRecord {
    /// Node id on the bus
    pub node_id: u8,
    /// Position label of the node
    pub label: String<MAX_LABEL_LEN>,
    /// Channel index, 0 being the nearest obstacle
    pub channel: u8,
    /// Calibration describing this channel at the time of the reading
    pub calibration: ChannelCalibration,
    /// Distance in meters, or -1 when nothing was seen
    pub range: f32,
}

impl RangeRecord {
    /// Whether the channel saw an obstacle
    pub fn is_valid(&self) -> bool {
        self.range != INVALID_DISTANCE
    }

    /// Range in centimeters
    pub fn range_cm(&self) -> f32 {
        self.range * 100.0
    }
}
