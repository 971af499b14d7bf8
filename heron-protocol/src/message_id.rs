//! Compact CAN message identifiers
//!
//! A message id carries the service id on bits 10..6 and the node id on
//! bits 5..0, so every valid id fits in 11 bits whatever the address width.

use crate::frame::FrameError;

/// Largest service id (5 bits)
pub const MAX_SERVICE_ID: u32 = 0b1_1111;

/// Largest node id (6 bits)
pub const MAX_NODE_ID: u32 = 0b11_1111;

/// Number of bits reserved for the node id
const NODE_ID_BITS: u32 = 6;

/// Pack a service id and a node id into a compact message id
pub const fn compact(service_id: u32, node_id: u32) -> Result<u32, FrameError> {
    if service_id > MAX_SERVICE_ID || node_id > MAX_NODE_ID {
        return Err(FrameError::OutOfRange);
    }
    Ok(service_id << NODE_ID_BITS | node_id)
}

/// Split a compact message id into `(service_id, node_id)`
///
/// The split is structural: ids wider than 11 bits (possible in extended
/// frames) yield a service id above [`MAX_SERVICE_ID`].
pub const fn decompact(id: u32) -> (u32, u8) {
    let service_id = id >> NODE_ID_BITS;
    let node_id = id - (service_id << NODE_ID_BITS);
    (service_id, node_id as u8)
}

/// A (service id, node id) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MessageId {
    /// Logical operation of the message
    pub service_id: u32,
    /// Sensor node on the bus
    pub node_id: u8,
}

impl MessageId {
    /// Create a message id, rejecting values that do not fit the packed form
    pub const fn new(service_id: u32, node_id: u32) -> Result<Self, FrameError> {
        if service_id > MAX_SERVICE_ID || node_id > MAX_NODE_ID {
            return Err(FrameError::OutOfRange);
        }
        Ok(Self {
            service_id,
            node_id: node_id as u8,
        })
    }

    /// Rebuild a message id from its compact form
    pub const fn from_compact(id: u32) -> Self {
        let (service_id, node_id) = decompact(id);
        Self {
            service_id,
            node_id,
        }
    }

    /// Compact form of this id
    pub const fn compact(&self) -> u32 {
        self.service_id << NODE_ID_BITS | self.node_id as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_compact_example() {
        // service 1, node 11 -> 1 * 64 + 11
        assert_eq!(compact(1, 11), Ok(75));
        assert_eq!(decompact(75), (1, 11));
    }

    #[test]
    fn test_compact_bounds() {
        assert_eq!(compact(31, 63), Ok(0x7FF));
        assert_eq!(compact(32, 0), Err(FrameError::OutOfRange));
        assert_eq!(compact(0, 64), Err(FrameError::OutOfRange));
    }

    #[test]
    fn test_message_id_bounds() {
        assert!(MessageId::new(31, 0).is_ok());
        assert!(MessageId::new(0, 63).is_ok());
        assert_eq!(MessageId::new(32, 0), Err(FrameError::OutOfRange));
        assert_eq!(MessageId::new(0, 64), Err(FrameError::OutOfRange));
    }

    #[test]
    fn test_decompact_wide_id() {
        // Extended frames may carry ids beyond 11 bits
        let id = MessageId::from_compact(0x0001_0005);
        assert_eq!(id.service_id, 0x0001_0005 >> 6);
        assert_eq!(id.node_id, 5);
        assert_eq!(id.compact(), 0x0001_0005);
    }

    proptest! {
        #[test]
        fn prop_decompact_inverts_compact(service in 0u32..=31, node in 0u32..=63) {
            let id = compact(service, node).unwrap();
            prop_assert!(id < 1 << 11);
            prop_assert_eq!(decompact(id), (service, node as u8));
        }

        #[test]
        fn prop_from_compact_inverts_compact(id in any::<u32>()) {
            prop_assert_eq!(MessageId::from_compact(id).compact(), id);
        }
    }
}
