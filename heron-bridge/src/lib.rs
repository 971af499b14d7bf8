//! Heron bridge - host side of the USB/CAN sensor link
//!
//! Wires the protocol codec and sensor decoder to a serial port:
//!
//! ```text
//!              ┌────────────┐  SetPeriod / RequestReading
//!              │  poller    │ ───────────────────────────┐
//!              └────────────┘                            ▼
//! ┌─────────┐  ┌────────────┐  frames   ┌─────────┐  ┌────────┐
//! │  sink   │◀─│ publisher  │◀──────────│ manager │◀─│ reader │◀── serial
//! └─────────┘  └────────────┘  ranges   └─────────┘  └────────┘
//! ```
//!
//! Each node's state sits behind its own lock; the reader is the only
//! writer, the publisher the only reader.

pub mod config;
pub mod error;
pub mod manager;
pub mod sink;
pub mod tasks;
pub mod transport;

pub use error::{Error, Result};
pub use manager::SensorManager;
pub use sink::{ChannelSink, LogSink, RangeSink};
pub use tasks::Bridge;
