//! Configuration type definitions
//!
//! These types describe the converter link and the sensor nodes registered
//! at startup. Node registration is fixed for the lifetime of the process.

use heapless::{String, Vec};
use heron_protocol::{AddressWidth, MAX_NODE_ID};

use crate::sensor::SensorVariant;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum label length
pub const MAX_LABEL_LEN: usize = 16;

/// Maximum serial port path length
pub const MAX_PORT_LEN: usize = 64;

/// Maximum registered nodes (one per 6-bit node id)
pub const MAX_NODES: usize = 64;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// No sensor node registered
    NoSensors,
    /// Node id does not fit in 6 bits
    NodeIdOutOfRange(u8),
    /// Same node id registered twice
    DuplicateNode(u8),
    /// Period is zero or does not fit the 16-bit set-period payload
    InvalidPeriod,
    /// Serial port path is empty
    MissingPort,
    /// Baud rate is zero
    InvalidBaudrate,
}

/// USB/CAN converter link
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConverterConfig {
    /// Serial device path
    pub port: String<MAX_PORT_LEN>,
    /// Baud rate
    pub baudrate: u32,
    /// Address field width used for outgoing frames
    pub address_width: AddressWidth,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            port: label("/dev/ttyUSB0"),
            baudrate: 115200,
            address_width: AddressWidth::Standard,
        }
    }
}

/// A sensor node registered on the bus
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeConfig {
    /// Node id (0-63)
    pub id: u8,
    /// Position label (e.g., "ir_front_left")
    pub name: String<MAX_LABEL_LEN>,
    /// Hardware variant
    #[cfg_attr(feature = "serde", serde(default))]
    pub variant: SensorVariant,
}

impl NodeConfig {
    /// Create a node entry; names longer than [`MAX_LABEL_LEN`] are cut
    pub fn new(id: u8, name: &str, variant: SensorVariant) -> Self {
        Self {
            id,
            name: label(name),
            variant,
        }
    }
}

/// Complete bridge configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BridgeConfig {
    /// Converter link
    pub converter: ConverterConfig,
    /// Polling and publishing period in milliseconds
    pub period_ms: u32,
    /// Registered sensor nodes
    pub sensors: Vec<NodeConfig, MAX_NODES>,
}

impl Default for BridgeConfig {
    /// Heron robot layout: five infrared nodes around the hull and two
    /// mixed nodes on the sides
    fn default() -> Self {
        let mut sensors = Vec::new();
        for node in [
            NodeConfig::new(11, "ir_front_left", SensorVariant::Infrared),
            NodeConfig::new(12, "ir_front_right", SensorVariant::Infrared),
            NodeConfig::new(13, "ir_back_left", SensorVariant::Infrared),
            NodeConfig::new(14, "ir_back_right", SensorVariant::Infrared),
            NodeConfig::new(15, "ir_back", SensorVariant::Infrared),
            NodeConfig::new(21, "ir_us_left", SensorVariant::InfraredUltrasonic),
            NodeConfig::new(22, "ir_us_right", SensorVariant::InfraredUltrasonic),
        ] {
            let _ = sensors.push(node);
        }

        Self {
            converter: ConverterConfig::default(),
            period_ms: 10,
            sensors,
        }
    }
}

impl BridgeConfig {
    /// Check the configuration before opening the link
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.converter.port.is_empty() {
            return Err(ConfigError::MissingPort);
        }
        if self.converter.baudrate == 0 {
            return Err(ConfigError::InvalidBaudrate);
        }
        if self.period_ms == 0 || self.period_ms > u16::MAX as u32 {
            return Err(ConfigError::InvalidPeriod);
        }
        if self.sensors.is_empty() {
            return Err(ConfigError::NoSensors);
        }

        for (i, node) in self.sensors.iter().enumerate() {
            if node.id as u32 > MAX_NODE_ID {
                return Err(ConfigError::NodeIdOutOfRange(node.id));
            }
            if self.sensors[..i].iter().any(|other| other.id == node.id) {
                return Err(ConfigError::DuplicateNode(node.id));
            }
        }
        Ok(())
    }

    /// Find a registered node by id
    pub fn node(&self, id: u8) -> Option<&NodeConfig> {
        self.sensors.iter().find(|n| n.id == id)
    }

    /// Period as carried by the set-period command
    ///
    /// Saturates; [`validate`](Self::validate) rejects periods that would.
    pub fn period_ms_u16(&self) -> u16 {
        self.period_ms.min(u16::MAX as u32) as u16
    }
}

/// Copy `text` into a fixed-capacity string, cutting at a char boundary
fn label<const N: usize>(text: &str) -> String<N> {
    let mut out = String::new();
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
