//! Transport layer for the converter link
//!
//! Both transports implement the `heron-hal` UART traits, so the codec and
//! the worker threads never see which one they run on.

mod mock;
mod serial;

pub use mock::{MockTransport, DEFAULT_WRITE_LOG};
pub use serial::SerialTransport;
