//! USB/CAN Converter Protocol
//!
//! This crate defines the serial protocol between the host and the USB/CAN
//! converter that tunnels CAN messages to the EDUCAT distance sensor nodes.
//!
//! # Protocol Overview
//!
//! Every CAN message travels in one frame bounded by two sentinels:
//! ```text
//! ┌───────┬────────┬─────────┬─────────────┬─────┐
//! │ START │ CONFIG │ ADDRESS │ PAYLOAD     │ END │
//! │ 1B    │ 1B     │ 2B / 4B │ 0–15B       │ 1B  │
//! └───────┴────────┴─────────┴─────────────┴─────┘
//! ```
//!
//! The CAN address packs a service id and a node id (see [`message_id`]).
//! There is no checksum; a corrupted stream resynchronizes on the next START.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod frame;
pub mod message_id;
pub mod messages;

pub use frame::{
    encode_frame, recv_frame, send_frame, AddressWidth, Frame, FrameError, FrameType, RecvError,
    FRAME_END, FRAME_START, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE,
};
pub use message_id::{compact, decompact, MessageId, MAX_NODE_ID, MAX_SERVICE_ID};
pub use messages::{NodeCommand, SERVICE_READING, SERVICE_SET_PERIOD};
