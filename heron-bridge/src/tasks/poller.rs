//! Node poller
//!
//! Announces the reading period to every node once, then asks each node
//! for a reading every period.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::tick;
use heron_hal::UartTx;
use heron_protocol::{AddressWidth, NodeCommand};

use super::BridgeSettings;
use crate::error::Result;

/// Encode and write one command
pub fn send_command<W>(tx: &mut W, command: NodeCommand, address_width: AddressWidth) -> Result<()>
where
    W: UartTx<Error = io::Error>,
{
    let bytes = command.to_frame(address_width)?.encode_to_vec()?;
    tx.write_blocking(&bytes)?;
    tx.flush()?;
    Ok(())
}

/// Configure the nodes, then poll them until the running flag drops
pub fn poller_task<W>(
    mut tx: W,
    node_ids: &[u8],
    settings: BridgeSettings,
    running: &AtomicBool,
) -> Result<()>
where
    W: UartTx<Error = io::Error>,
{
    for &node_id in node_ids {
        let command = NodeCommand::SetPeriod {
            node_id,
            period_ms: settings.node_period_ms,
        };
        send_command(&mut tx, command, settings.address_width)?;
    }
    log::info!(
        "Set period {} ms on {} nodes",
        settings.node_period_ms,
        node_ids.len()
    );

    let ticker = tick(settings.period.max(Duration::from_millis(1)));
    while running.load(Ordering::Relaxed) {
        for &node_id in node_ids {
            send_command(
                &mut tx,
                NodeCommand::RequestReading { node_id },
                settings.address_width,
            )?;
        }
        let _ = ticker.recv();
    }

    log::debug!("Poller stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use std::sync::Arc;
    use std::thread;

    fn settings() -> BridgeSettings {
        BridgeSettings {
            period: Duration::from_millis(2),
            address_width: AddressWidth::Standard,
            node_period_ms: 10,
        }
    }

    #[test]
    fn test_send_command() {
        let mock = MockTransport::new();
        let mut tx = mock.clone();
        send_command(
            &mut tx,
            NodeCommand::RequestReading { node_id: 11 },
            AddressWidth::Standard,
        )
        .unwrap();
        assert_eq!(mock.get_written(), vec![0xAA, 0xD0, 0x8B, 0x00, 0x55]);
    }

    #[test]
    fn test_poller_configures_then_polls() {
        let mock = MockTransport::new();
        let running = Arc::new(AtomicBool::new(true));

        let handle = {
            let tx = mock.clone();
            let running = Arc::clone(&running);
            thread::spawn(move || poller_task(tx, &[11, 12], settings(), &running))
        };
        thread::sleep(Duration::from_millis(20));
        running.store(false, Ordering::Relaxed);
        assert!(handle.join().unwrap().is_ok());

        let mut expected = Vec::new();
        for node_id in [11, 12] {
            let frame = NodeCommand::SetPeriod {
                node_id,
                period_ms: 10,
            }
            .to_frame(AddressWidth::Standard)
            .unwrap();
            expected.extend_from_slice(&frame.encode_to_vec().unwrap());
        }
        for node_id in [11, 12] {
            let frame = NodeCommand::RequestReading { node_id }
                .to_frame(AddressWidth::Standard)
                .unwrap();
            expected.extend_from_slice(&frame.encode_to_vec().unwrap());
        }

        let written = mock.get_written();
        assert!(written.len() > expected.len());
        assert_eq!(&written[..expected.len()], &expected[..]);
    }

    #[test]
    fn test_poller_on_mock_link_stays_bounded() {
        let mock = MockTransport::with_write_limit(64);
        let running = Arc::new(AtomicBool::new(true));

        let handle = {
            let tx = mock.clone();
            let running = Arc::clone(&running);
            thread::spawn(move || poller_task(tx, &[11, 12, 13, 14, 15], settings(), &running))
        };
        thread::sleep(Duration::from_millis(30));
        running.store(false, Ordering::Relaxed);
        assert!(handle.join().unwrap().is_ok());

        let written = mock.get_written();
        assert_eq!(written.len(), 64);
        // Log ends on a complete request for the last node
        let last = NodeCommand::RequestReading { node_id: 15 }
            .to_frame(AddressWidth::Standard)
            .unwrap()
            .encode_to_vec()
            .unwrap();
        assert!(written.ends_with(&last));
    }

    #[test]
    fn test_poller_stops_on_write_failure() {
        let mock = MockTransport::new();
        mock.disconnect();
        let running = AtomicBool::new(true);
        let result = poller_task(mock, &[11], settings(), &running);
        assert!(matches!(result, Err(crate::Error::Io(_))));
    }
}
