//! Service messages exchanged with EDUCAT sensor nodes
//!
//! Host → node:
//! - Set period (data frame, service 1): reporting period in milliseconds
//! - Request reading (remote frame, service 2)
//!
//! Node → host:
//! - Reading (data frame, service 2): raw distances, see `heron-core`

use crate::frame::{AddressWidth, Frame, FrameError, FrameType};
use crate::message_id::MessageId;

/// Service id: configure the node reporting period
pub const SERVICE_SET_PERIOD: u32 = 1;

/// Service id: distance reading request and reply
pub const SERVICE_READING: u32 = 2;

/// Commands sent from the host to a sensor node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NodeCommand {
    /// Set the node's measurement period
    SetPeriod { node_id: u8, period_ms: u16 },
    /// Ask the node for a fresh reading
    RequestReading { node_id: u8 },
}

impl NodeCommand {
    /// Node addressed by this command
    pub fn node_id(&self) -> u8 {
        match self {
            NodeCommand::SetPeriod { node_id, .. } | NodeCommand::RequestReading { node_id } => {
                *node_id
            }
        }
    }

    /// Encode this command into a frame
    pub fn to_frame(&self, address_width: AddressWidth) -> Result<Frame, FrameError> {
        match *self {
            NodeCommand::SetPeriod { node_id, period_ms } => {
                let id = MessageId::new(SERVICE_SET_PERIOD, node_id as u32)?;
                // Big-endian, no leading zero byte
                let bytes = period_ms.to_be_bytes();
                let payload = if period_ms > 0xFF { &bytes[..] } else { &bytes[1..] };
                Frame::new(FrameType::Data, address_width, id, payload)
            }
            NodeCommand::RequestReading { node_id } => {
                let id = MessageId::new(SERVICE_READING, node_id as u32)?;
                Frame::remote(address_width, id)
            }
        }
    }

    /// Parse a command from a host-originated frame (for testing or simulation)
    pub fn from_frame(frame: &Frame) -> Option<Self> {
        let node_id = frame.node_id();
        match (frame.frame_type, frame.service_id()) {
            (FrameType::Data, SERVICE_SET_PERIOD) => {
                let period_ms = match frame.payload[..] {
                    [low] => low as u16,
                    [high, low] => u16::from_be_bytes([high, low]),
                    _ => return None,
                };
                Some(NodeCommand::SetPeriod { node_id, period_ms })
            }
            (FrameType::Remote, SERVICE_READING) => Some(NodeCommand::RequestReading { node_id }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_period_short() {
        let cmd = NodeCommand::SetPeriod {
            node_id: 11,
            period_ms: 10,
        };
        let frame = cmd.to_frame(AddressWidth::Standard).unwrap();
        assert_eq!(frame.frame_type, FrameType::Data);
        assert_eq!(frame.service_id(), SERVICE_SET_PERIOD);
        assert_eq!(frame.node_id(), 11);
        assert_eq!(&frame.payload[..], &[0x0A]);
    }

    #[test]
    fn test_set_period_two_bytes() {
        let cmd = NodeCommand::SetPeriod {
            node_id: 21,
            period_ms: 1000,
        };
        let frame = cmd.to_frame(AddressWidth::Standard).unwrap();
        assert_eq!(&frame.payload[..], &[0x03, 0xE8]);
    }

    #[test]
    fn test_request_reading_wire_bytes() {
        let cmd = NodeCommand::RequestReading { node_id: 11 };
        let bytes = cmd
            .to_frame(AddressWidth::Standard)
            .unwrap()
            .encode_to_vec()
            .unwrap();
        // 2 * 64 + 11 = 139 = 0x8B
        assert_eq!(&bytes[..], &[0xAA, 0xD0, 0x8B, 0x00, 0x55]);
    }

    #[test]
    fn test_node_id_out_of_range() {
        let cmd = NodeCommand::RequestReading { node_id: 64 };
        assert_eq!(
            cmd.to_frame(AddressWidth::Standard),
            Err(FrameError::OutOfRange)
        );
    }

    #[test]
    fn test_command_roundtrip() {
        for original in [
            NodeCommand::SetPeriod {
                node_id: 3,
                period_ms: 250,
            },
            NodeCommand::SetPeriod {
                node_id: 63,
                period_ms: 0xFFFF,
            },
            NodeCommand::RequestReading { node_id: 42 },
        ] {
            let frame = original.to_frame(AddressWidth::Extended).unwrap();
            assert_eq!(NodeCommand::from_frame(&frame), Some(original));
            assert_eq!(original.node_id(), frame.node_id());
        }
    }

    #[test]
    fn test_reading_reply_is_not_a_command() {
        let id = MessageId::new(SERVICE_READING, 11).unwrap();
        let frame = Frame::new(FrameType::Data, AddressWidth::Standard, id, &[0; 6]).unwrap();
        assert_eq!(NodeCommand::from_frame(&frame), None);
    }
}
