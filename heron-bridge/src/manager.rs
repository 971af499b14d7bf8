//! Sensor node registry
//!
//! Built once from the configuration. Each node has its own lock so the
//! reader updating one node never blocks the publisher on another.

use std::collections::BTreeMap;

use heron_core::config::BridgeConfig;
use heron_core::sensor::{RangeRecord, SensorState};
use heron_protocol::Frame;
use parking_lot::Mutex;

/// Registered sensor nodes, keyed by node id
pub struct SensorManager {
    nodes: BTreeMap<u8, Mutex<SensorState>>,
}

impl SensorManager {
    /// Register every node of the configuration
    pub fn new(config: &BridgeConfig) -> Self {
        let nodes = config
            .sensors
            .iter()
            .map(|node| {
                let state = SensorState::new(node.id, node.name.clone(), node.variant);
                (node.id, Mutex::new(state))
            })
            .collect();
        Self { nodes }
    }

    /// Route a decoded frame to the node it addresses
    ///
    /// Returns whether a node's reading changed. Frames for unknown nodes
    /// are ignored.
    pub fn dispatch(&self, frame: &Frame) -> bool {
        let Some(node) = self.nodes.get(&frame.node_id()) else {
            log::trace!("Ignoring frame for unregistered node {}", frame.node_id());
            return false;
        };
        node.lock().handle_frame(frame)
    }

    /// Registered node ids, ascending
    pub fn node_ids(&self) -> impl Iterator<Item = u8> + '_ {
        self.nodes.keys().copied()
    }

    /// Number of registered nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node is registered
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Copy of a node's last reading
    pub fn distances(&self, id: u8) -> Option<Vec<f32>> {
        self.nodes
            .get(&id)
            .map(|node| node.lock().distances().to_vec())
    }

    /// Snapshot of every channel of every node that has reported
    pub fn ranges(&self) -> Vec<RangeRecord> {
        self.nodes
            .values()
            .flat_map(|node| node.lock().ranges().collect::<Vec<_>>())
            .collect()
    }
}
