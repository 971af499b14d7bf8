//! Bridge worker threads
//!
//! Three threads share the sensor manager and a running flag:
//! - `reader`: decodes frames from the converter and updates the nodes
//! - `poller`: configures the nodes, then requests a reading every period
//! - `publisher`: snapshots the nodes every period and feeds the sink
//!
//! Any thread hitting a link failure clears the flag, which stops the
//! others at their next iteration.

mod poller;
mod publisher;
mod reader;

pub use poller::{poller_task, send_command};
pub use publisher::publisher_task;
pub use reader::reader_task;

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use heron_core::config::BridgeConfig;
use heron_hal::{UartRx, UartTx};
use heron_protocol::AddressWidth;

use crate::error::{Error, Result};
use crate::manager::SensorManager;
use crate::sink::RangeSink;

/// Timing and addressing shared by the worker threads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeSettings {
    /// Poll and publish period
    pub period: Duration,
    /// Address width of outgoing commands
    pub address_width: AddressWidth,
    /// Period announced to the nodes at startup
    pub node_period_ms: u16,
}

impl BridgeSettings {
    pub fn from_config(config: &BridgeConfig) -> Self {
        Self {
            period: Duration::from_millis(config.period_ms as u64),
            address_width: config.converter.address_width,
            node_period_ms: config.period_ms_u16(),
        }
    }
}

/// Running bridge
pub struct Bridge {
    running: Arc<AtomicBool>,
    handles: Vec<(&'static str, JoinHandle<Result<()>>)>,
}

impl Bridge {
    /// Start the reader, poller and publisher threads
    ///
    /// `rx` and `tx` may be two handles on the same port.
    pub fn spawn<R, W, S>(
        rx: R,
        tx: W,
        manager: Arc<SensorManager>,
        sink: S,
        settings: BridgeSettings,
    ) -> Result<Self>
    where
        R: UartRx<Error = io::Error> + Send + 'static,
        W: UartTx<Error = io::Error> + Send + 'static,
        S: RangeSink + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let mut bridge = Bridge {
            running: Arc::clone(&running),
            handles: Vec::new(),
        };

        let reader_manager = Arc::clone(&manager);
        let reader_running = Arc::clone(&running);
        bridge.start("reader", move || {
            reader_task(rx, &reader_manager, &reader_running)
        })?;

        let node_ids: Vec<u8> = manager.node_ids().collect();
        log::info!(
            "Bridge starting: {} nodes, period {} ms",
            node_ids.len(),
            settings.period.as_millis()
        );
        let poller_running = Arc::clone(&running);
        bridge.start("poller", move || {
            poller_task(tx, &node_ids, settings, &poller_running)
        })?;

        let publisher_running = Arc::clone(&running);
        bridge.start("publisher", move || {
            publisher_task(sink, &manager, settings.period, &publisher_running)
        })?;

        Ok(bridge)
    }

    fn start<F>(&mut self, name: &'static str, task: F) -> Result<()>
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        let running = Arc::clone(&self.running);
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let result = task();
                if let Err(e) = &result {
                    log::error!("{} stopped: {}", name, e);
                }
                running.store(false, Ordering::Relaxed);
                result
            })
            .map_err(|e| {
                self.running.store(false, Ordering::Relaxed);
                Error::Spawn(name, e)
            })?;
        self.handles.push((name, handle));
        Ok(())
    }

    /// Flag shared with the worker threads; clearing it stops the bridge
    pub fn running(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Whether every worker is still running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Ask the workers to stop
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Wait for every worker; the first failure wins
    pub fn join(self) -> Result<()> {
        let mut outcome = Ok(());
        for (name, handle) in self.handles {
            let result = match handle.join() {
                Ok(result) => result,
                Err(_) => Err(Error::ThreadPanicked(name)),
            };
            if outcome.is_ok() {
                outcome = result;
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::ChannelSink;
    use crate::transport::MockTransport;
    use heron_protocol::{Frame, FrameType, MessageId, NodeCommand, SERVICE_READING};

    fn settings() -> BridgeSettings {
        let mut config = BridgeConfig::default();
        config.period_ms = 5;
        BridgeSettings::from_config(&config)
    }

    #[test]
    fn test_settings_from_config() {
        let settings = BridgeSettings::from_config(&BridgeConfig::default());
        assert_eq!(settings.period, Duration::from_millis(10));
        assert_eq!(settings.node_period_ms, 10);
        assert_eq!(settings.address_width, AddressWidth::Standard);
    }

    #[test]
    fn test_bridge_end_to_end() {
        let link = MockTransport::new();
        let manager = Arc::new(SensorManager::new(&BridgeConfig::default()));
        let (tx, rx) = crossbeam_channel::unbounded();

        let bridge = Bridge::spawn(
            link.clone(),
            link.clone(),
            Arc::clone(&manager),
            ChannelSink::new(tx),
            settings(),
        )
        .unwrap();

        // Node 21 answers: ultrasound 30 cm, infrared 80 / 100 / 70 cm
        let id = MessageId::new(SERVICE_READING, 21).unwrap();
        let reply = Frame::new(
            FrameType::Data,
            AddressWidth::Standard,
            id,
            &[0x00, 0x00, 0x00, 0x1E, 0x50, 0x64, 0x46],
        )
        .unwrap();
        link.inject_read(&reply.encode_to_vec().unwrap());

        let snapshot = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        bridge.shutdown();
        assert!(bridge.join().is_ok());

        let ranges: Vec<f32> = snapshot.iter().map(|r| r.range).collect();
        assert_eq!(ranges, vec![0.3, 0.3, 0.8, 1.0, 0.7]);
        assert!(snapshot.iter().all(|r| r.label == "ir_us_left"));

        // The first frames on the wire configure node 11
        let set_period = NodeCommand::SetPeriod {
            node_id: 11,
            period_ms: 5,
        }
        .to_frame(AddressWidth::Standard)
        .unwrap()
        .encode_to_vec()
        .unwrap();
        assert!(link.get_written().starts_with(&set_period));
    }

    #[test]
    fn test_link_failure_stops_bridge() {
        let link = MockTransport::new();
        let manager = Arc::new(SensorManager::new(&BridgeConfig::default()));
        let (tx, _rx) = crossbeam_channel::unbounded();

        let bridge = Bridge::spawn(
            link.clone(),
            link.clone(),
            manager,
            ChannelSink::new(tx),
            settings(),
        )
        .unwrap();
        link.disconnect();

        let result = bridge.join();
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
