//! Frame reader
//!
//! Pulls frames off the converter link and hands them to the manager.
//! Framing errors only cost the bytes involved; the next call resyncs on
//! the following START byte.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use heron_hal::UartRx;
use heron_protocol::{recv_frame, FrameError, RecvError};

use crate::error::Result;
use crate::manager::SensorManager;

/// Read frames until the running flag drops or the link fails
pub fn reader_task<R>(mut rx: R, manager: &SensorManager, running: &AtomicBool) -> Result<()>
where
    R: UartRx<Error = io::Error>,
{
    log::debug!("Reader started");
    let mut frames = 0u64;
    let mut rejected = 0u64;

    while running.load(Ordering::Relaxed) {
        match recv_frame(&mut rx) {
            Ok(frame) => {
                frames += 1;
                if !manager.dispatch(&frame) {
                    log::trace!(
                        "Unused frame: service {} node {} ({} bytes)",
                        frame.service_id(),
                        frame.node_id(),
                        frame.payload.len()
                    );
                }
            }
            // Idle line and garbage between frames
            Err(RecvError::Frame(FrameError::FrameDesync)) => {}
            Err(RecvError::Frame(e)) => {
                rejected += 1;
                log::debug!("Dropped frame: {:?}", e);
            }
            Err(RecvError::Io(e)) => return Err(e.into()),
        }
    }

    log::debug!("Reader stopped: {} frames, {} rejected", frames, rejected);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use heron_core::config::BridgeConfig;
    use heron_protocol::{AddressWidth, Frame, FrameType, MessageId, SERVICE_READING};
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    fn reading_bytes(node_id: u8, payload: &[u8]) -> Vec<u8> {
        let id = MessageId::new(SERVICE_READING, node_id as u32).unwrap();
        Frame::new(FrameType::Data, AddressWidth::Standard, id, payload)
            .unwrap()
            .encode_to_vec()
            .unwrap()
            .to_vec()
    }

    #[test]
    fn test_reader_survives_garbage() {
        let mock = MockTransport::new();
        let manager = Arc::new(SensorManager::new(&BridgeConfig::default()));
        let running = Arc::new(AtomicBool::new(true));

        // Noise, a frame with a broken trailer, then a good reading
        mock.inject_read(&[0x00, 0x13, 0x55]);
        let mut broken = reading_bytes(11, &[0, 0, 10, 10, 10, 10]);
        if let Some(end) = broken.last_mut() {
            *end = 0x00;
        }
        mock.inject_read(&broken);
        mock.inject_read(&reading_bytes(11, &[0x00, 0x00, 0x32, 0x14, 0x28, 0x3C]));

        let handle = {
            let rx = mock.clone();
            let manager = Arc::clone(&manager);
            let running = Arc::clone(&running);
            thread::spawn(move || reader_task(rx, &manager, &running))
        };

        let deadline = Instant::now() + Duration::from_secs(2);
        while manager.distances(11) == Some(vec![]) && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(2));
        }
        running.store(false, Ordering::Relaxed);

        assert!(handle.join().unwrap().is_ok());
        assert_eq!(manager.distances(11), Some(vec![0.2, 0.5, 0.4, 0.2, 0.6]));
    }

    #[test]
    fn test_reader_stops_on_link_failure() {
        let mock = MockTransport::new();
        mock.disconnect();
        let manager = SensorManager::new(&BridgeConfig::default());
        let running = AtomicBool::new(true);

        let result = reader_task(mock, &manager, &running);
        assert!(matches!(result, Err(crate::Error::Io(_))));
    }
}
