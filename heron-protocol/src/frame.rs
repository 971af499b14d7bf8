//! Frame encoding and decoding for the USB/CAN converter protocol.
//!
//! Frame format:
//! - START (1 byte): 0xAA synchronization byte
//! - CONFIG (1 byte): `11` marker, address width, frame type, payload length
//! - ADDRESS (2 or 4 bytes): compact message id, little-endian
//! - PAYLOAD (0-15 bytes): CAN data
//! - END (1 byte): 0x55 terminator
//!
//! CONFIG bit layout:
//! ```text
//!  7   6   5          4        3..0
//! ┌───┬───┬──────────┬────────┬────────────┐
//! │ 1 │ 1 │ extended │ remote │ length     │
//! └───┴───┴──────────┴────────┴────────────┘
//! ```

use heapless::Vec;
use heron_hal::UartRx;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::message_id::{compact, MessageId};

/// Frame synchronization byte
pub const FRAME_START: u8 = 0xAA;

/// Frame terminator byte
pub const FRAME_END: u8 = 0x55;

/// Maximum payload size in bytes (4-bit length field)
pub const MAX_PAYLOAD_SIZE: usize = 15;

/// Maximum complete frame size (START + CONFIG + 4B ADDRESS + MAX_PAYLOAD + END)
pub const MAX_FRAME_SIZE: usize = 1 + 1 + 4 + MAX_PAYLOAD_SIZE + 1;

const CONFIG_MARKER: u8 = 0b1100_0000;
const CONFIG_EXTENDED: u8 = 0b0010_0000;
const CONFIG_REMOTE: u8 = 0b0001_0000;
const CONFIG_LENGTH_MASK: u8 = 0b0000_1111;

/// Errors that can occur during frame encoding or decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Service id, node id or message id does not fit its field
    OutOfRange,
    /// Payload exceeds [`MAX_PAYLOAD_SIZE`]
    PayloadTooLarge,
    /// First byte was not START; skip ahead and retry
    FrameDesync,
    /// END missing or the stream went quiet mid-frame
    FrameTruncated,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// Error returned by [`recv_frame`]
///
/// Framing problems are recoverable by calling again; `Io` comes from the
/// underlying channel and usually means the link is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecvError<E> {
    /// Malformed or incomplete frame
    Frame(FrameError),
    /// Byte channel failure
    Io(E),
}

impl<E> From<FrameError> for RecvError<E> {
    fn from(e: FrameError) -> Self {
        RecvError::Frame(e)
    }
}

/// CAN frame type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FrameType {
    /// Frame carrying data
    #[default]
    Data,
    /// Remote request, no data expected
    Remote,
}

/// Width of the CAN address field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AddressWidth {
    /// 2-byte address field
    #[default]
    Standard,
    /// 4-byte address field
    Extended,
}

impl AddressWidth {
    /// Number of address bytes on the wire
    pub const fn byte_count(self) -> usize {
        match self {
            AddressWidth::Standard => 2,
            AddressWidth::Extended => 4,
        }
    }

    /// Largest id the field can carry
    pub const fn max_id(self) -> u32 {
        match self {
            AddressWidth::Standard => 0xFFFF,
            AddressWidth::Extended => 0xFFFF_FFFF,
        }
    }
}

/// A parsed or constructed frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Data or remote frame
    pub frame_type: FrameType,
    /// Width of the address field on the wire
    pub address_width: AddressWidth,
    /// Service and node addressed by this frame
    pub id: MessageId,
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    /// Create a new frame
    pub fn new(
        frame_type: FrameType,
        address_width: AddressWidth,
        id: MessageId,
        payload: &[u8],
    ) -> Result<Self, FrameError> {
        if id.compact() > address_width.max_id() {
            return Err(FrameError::OutOfRange);
        }

        let payload = Vec::from_slice(payload).map_err(|_| FrameError::PayloadTooLarge)?;

        Ok(Self {
            frame_type,
            address_width,
            id,
            payload,
        })
    }

    /// Create a remote frame (no payload)
    pub fn remote(address_width: AddressWidth, id: MessageId) -> Result<Self, FrameError> {
        Self::new(FrameType::Remote, address_width, id, &[])
    }

    /// Service id of the addressed message
    pub fn service_id(&self) -> u32 {
        self.id.service_id
    }

    /// Node id of the addressed sensor
    pub fn node_id(&self) -> u8 {
        self.id.node_id
    }

    /// Build the CONFIG byte for this frame
    pub fn config_byte(&self) -> u8 {
        let mut config = CONFIG_MARKER;
        if self.address_width == AddressWidth::Extended {
            config |= CONFIG_EXTENDED;
        }
        if self.frame_type == FrameType::Remote {
            config |= CONFIG_REMOTE;
        }
        config | self.payload.len() as u8
    }

    /// Number of bytes this frame occupies on the wire
    pub fn encoded_len(&self) -> usize {
        3 + self.address_width.byte_count() + self.payload.len()
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = self.encoded_len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        let width = self.address_width.byte_count();
        let address = self.id.compact().to_le_bytes();

        buffer[0] = FRAME_START;
        buffer[1] = self.config_byte();
        buffer[2..2 + width].copy_from_slice(&address[..width]);
        let payload_start = 2 + width;
        buffer[payload_start..payload_start + self.payload.len()].copy_from_slice(&self.payload);
        buffer[frame_len - 1] = FRAME_END;

        Ok(frame_len)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(&mut buffer)?;
        Vec::from_slice(&buffer[..len]).map_err(|_| FrameError::BufferTooSmall)
    }

    /// Parse one frame from the start of `bytes`
    ///
    /// Returns the frame and the number of bytes it occupied. Running out of
    /// bytes after START reports [`FrameError::FrameTruncated`].
    pub fn parse(bytes: &[u8]) -> Result<(Self, usize), FrameError> {
        let mut pos = 0;
        let frame = decode(|| -> Result<Option<u8>, core::convert::Infallible> {
            let byte = bytes.get(pos).copied();
            if byte.is_some() {
                pos += 1;
            }
            Ok(byte)
        })
        .map_err(|e| match e {
            RecvError::Frame(e) => e,
            RecvError::Io(never) => match never {},
        })?;
        Ok((frame, pos))
    }
}

/// Encode a frame from its raw parts
///
/// `id` is a compact message id and must fit `address_width`.
pub fn encode_frame(
    frame_type: FrameType,
    id: u32,
    payload: &[u8],
    address_width: AddressWidth,
) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(FrameError::PayloadTooLarge);
    }
    Frame::new(frame_type, address_width, MessageId::from_compact(id), payload)?.encode_to_vec()
}

/// Encode a frame addressed to `(service_id, node_id)`
pub fn send_frame(
    frame_type: FrameType,
    service_id: u32,
    node_id: u32,
    payload: &[u8],
    address_width: AddressWidth,
) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
    let id = compact(service_id, node_id)?;
    encode_frame(frame_type, id, payload, address_width)
}

/// Read one frame from a byte channel
///
/// Each call starts from START; nothing is retained between calls. On
/// [`FrameError::FrameDesync`] only the offending byte has been consumed,
/// so calling again walks the stream forward until the next START.
pub fn recv_frame<R: UartRx>(rx: &mut R) -> Result<Frame, RecvError<R::Error>> {
    decode(|| rx.read_byte())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Waiting for START byte
    WaitStart,
    /// Got START, waiting for CONFIG
    ReadConfig,
    /// Reading the little-endian address field
    ReadAddress,
    /// Reading payload bytes
    ReadPayload,
    /// Waiting for END
    WaitEnd,
}

fn decode<E>(
    mut next_byte: impl FnMut() -> Result<Option<u8>, E>,
) -> Result<Frame, RecvError<E>> {
    let mut state = ParseState::WaitStart;
    let mut frame_type = FrameType::Data;
    let mut address_width = AddressWidth::Standard;
    let mut payload_len = 0usize;
    let mut id = 0u32;
    let mut payload = Vec::<u8, MAX_PAYLOAD_SIZE>::new();

    loop {
        state = match state {
            ParseState::WaitStart => match next_byte().map_err(RecvError::Io)? {
                Some(FRAME_START) => ParseState::ReadConfig,
                _ => return Err(FrameError::FrameDesync.into()),
            },
            ParseState::ReadConfig => {
                let config = required(&mut next_byte)?;
                // A repeated START restarts the frame
                if config == FRAME_START {
                    continue;
                }
                if config & CONFIG_MARKER != CONFIG_MARKER {
                    return Err(FrameError::FrameDesync.into());
                }
                address_width = if config & CONFIG_EXTENDED != 0 {
                    AddressWidth::Extended
                } else {
                    AddressWidth::Standard
                };
                frame_type = if config & CONFIG_REMOTE != 0 {
                    FrameType::Remote
                } else {
                    FrameType::Data
                };
                payload_len = (config & CONFIG_LENGTH_MASK) as usize;
                ParseState::ReadAddress
            }
            ParseState::ReadAddress => {
                let mut address = [0u8; 4];
                for slot in address.iter_mut().take(address_width.byte_count()) {
                    *slot = required(&mut next_byte)?;
                }
                id = u32::from_le_bytes(address);
                if payload_len == 0 {
                    ParseState::WaitEnd
                } else {
                    ParseState::ReadPayload
                }
            }
            ParseState::ReadPayload => {
                let byte = required(&mut next_byte)?;
                // Capacity matches the 4-bit length field
                let _ = payload.push(byte);
                if payload.len() == payload_len {
                    ParseState::WaitEnd
                } else {
                    ParseState::ReadPayload
                }
            }
            ParseState::WaitEnd => {
                if required(&mut next_byte)? != FRAME_END {
                    return Err(FrameError::FrameTruncated.into());
                }
                return Ok(Frame {
                    frame_type,
                    address_width,
                    id: MessageId::from_compact(id),
                    payload,
                });
            }
        };
    }
}

/// Next byte past START; a missing byte means the frame was cut short
fn required<E>(
    next_byte: &mut impl FnMut() -> Result<Option<u8>, E>,
) -> Result<u8, RecvError<E>> {
    match next_byte() {
        Ok(Some(byte)) => Ok(byte),
        Ok(None) => Err(FrameError::FrameTruncated.into()),
        Err(e) => Err(RecvError::Io(e)),
    }
}
