//! EDUCAT distance sensors
//!
//! Decoding pipeline for a reading addressed to a node:
//!
//! ```text
//! payload ──extract──▶ raw meters ──correct──▶ distances ──▶ RangeRecord
//!            (variant)               (zero/clamp/nearest)
//! ```

pub mod correction;
pub mod range;
pub mod state;
pub mod variant;

pub use correction::correct_distance;
pub use range::RangeRecord;
pub use state::SensorState;
pub use variant::{
    ChannelCalibration, RadiationType, SensorVariant, CHANNEL_COUNT, INFRARED, INVALID_DISTANCE,
    ULTRASOUND,
};
