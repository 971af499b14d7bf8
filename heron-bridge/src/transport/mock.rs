//! Mock transport for testing

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use heron_hal::{UartRx, UartTx};
use parking_lot::Mutex;

/// How long an empty mock waits before reporting a timeout
const READ_TIMEOUT: Duration = Duration::from_millis(1);

/// Written bytes kept by default; older bytes are dropped first
pub const DEFAULT_WRITE_LOG: usize = 64 * 1024;

/// In-memory transport; clones share the same buffers
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

struct MockTransportInner {
    read_buffer: VecDeque<u8>,
    write_buffer: Vec<u8>,
    write_limit: usize,
    disconnected: bool,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::with_write_limit(DEFAULT_WRITE_LOG)
    }
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock that keeps at most the last `limit` written bytes
    pub fn with_write_limit(limit: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockTransportInner {
                read_buffer: VecDeque::new(),
                write_buffer: Vec::new(),
                write_limit: limit,
                disconnected: false,
            })),
        }
    }

    /// Inject data to be read
    pub fn inject_read(&self, data: &[u8]) {
        self.inner.lock().read_buffer.extend(data);
    }

    /// Get all written data
    pub fn get_written(&self) -> Vec<u8> {
        self.inner.lock().write_buffer.clone()
    }

    /// Clear written data
    pub fn clear_written(&self) {
        self.inner.lock().write_buffer.clear();
    }

    /// Make every further read and write fail
    pub fn disconnect(&self) {
        self.inner.lock().disconnected = true;
    }
}

fn broken_pipe() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "mock transport disconnected")
}

impl UartRx for MockTransport {
    type Error = io::Error;

    fn read_blocking(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = {
            let mut inner = self.inner.lock();
            if inner.disconnected {
                return Err(broken_pipe());
            }
            let available = inner.read_buffer.len().min(buf.len());
            for (slot, byte) in buf.iter_mut().zip(inner.read_buffer.drain(..available)) {
                *slot = byte;
            }
            available
        };

        if available == 0 {
            thread::sleep(READ_TIMEOUT);
        }
        Ok(available)
    }
}

impl UartTx for MockTransport {
    type Error = io::Error;

    fn write_blocking(&mut self, data: &[u8]) -> io::Result<()> {
        let mut inner = self.inner.lock();
        if inner.disconnected {
            return Err(broken_pipe());
        }
        inner.write_buffer.extend_from_slice(data);
        let excess = inner.write_buffer.len().saturating_sub(inner.write_limit);
        if excess > 0 {
            inner.write_buffer.drain(..excess);
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_buffers() {
        let mock = MockTransport::new();
        let mut reader = mock.clone();
        let mut writer = mock.clone();

        mock.inject_read(&[1, 2, 3]);
        let mut buf = [0u8; 2];
        assert_eq!(reader.read_blocking(&mut buf).unwrap(), 2);
        assert_eq!(buf, [1, 2]);
        assert_eq!(reader.read_byte().unwrap(), Some(3));
        assert_eq!(reader.read_byte().unwrap(), None);

        writer.write_blocking(&[9, 8]).unwrap();
        assert_eq!(mock.get_written(), vec![9, 8]);
        mock.clear_written();
        assert!(mock.get_written().is_empty());
    }

    #[test]
    fn test_write_log_keeps_newest_bytes() {
        let mock = MockTransport::with_write_limit(4);
        let mut writer = mock.clone();
        for chunk in [[1u8, 2, 3], [4, 5, 6], [7, 8, 9]] {
            writer.write_blocking(&chunk).unwrap();
        }
        assert_eq!(mock.get_written(), vec![6, 7, 8, 9]);
    }

    #[test]
    fn test_disconnect() {
        let mock = MockTransport::new();
        let mut port = mock.clone();
        mock.disconnect();
        assert!(port.read_byte().is_err());
        assert!(port.write_blocking(&[0]).is_err());
    }
}
