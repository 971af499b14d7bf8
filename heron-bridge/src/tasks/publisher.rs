//! Range publisher

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::tick;

use crate::error::Result;
use crate::manager::SensorManager;
use crate::sink::RangeSink;

/// Publish a snapshot of every node each period
///
/// Nodes that have not reported yet are left out of the snapshot.
pub fn publisher_task<S: RangeSink>(
    mut sink: S,
    manager: &SensorManager,
    period: Duration,
    running: &AtomicBool,
) -> Result<()> {
    let ticker = tick(period.max(Duration::from_millis(1)));
    while running.load(Ordering::Relaxed) {
        let _ = ticker.recv();
        let ranges = manager.ranges();
        if !ranges.is_empty() {
            sink.publish(&ranges)?;
        }
    }

    log::debug!("Publisher stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::ChannelSink;
    use heron_core::config::BridgeConfig;
    use heron_protocol::{AddressWidth, Frame, FrameType, MessageId, SERVICE_READING};

    #[test]
    fn test_publishes_reported_nodes_only() {
        let manager = SensorManager::new(&BridgeConfig::default());
        let id = MessageId::new(SERVICE_READING, 14).unwrap();
        let frame = Frame::new(
            FrameType::Data,
            AddressWidth::Standard,
            id,
            &[0x00, 0x00, 0x32, 0x32, 0x32, 0x32],
        )
        .unwrap();
        manager.dispatch(&frame);

        let (tx, rx) = crossbeam_channel::unbounded();
        let running = AtomicBool::new(true);

        // Receiver side goes away after the first snapshot, which ends the task
        let consumer = std::thread::spawn(move || rx.recv().ok());
        let result = publisher_task(
            ChannelSink::new(tx),
            &manager,
            Duration::from_millis(1),
            &running,
        );

        let snapshot = consumer.join().unwrap().unwrap();
        assert_eq!(snapshot.len(), 5);
        assert!(snapshot.iter().all(|r| r.node_id == 14));
        assert!(result.is_err());
    }
}
