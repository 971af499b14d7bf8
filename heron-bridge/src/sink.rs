//! Range publishing sinks
//!
//! The publisher hands every snapshot to a [`RangeSink`]. The bridge ships
//! with a logging sink for the console and a channel sink for embedding the
//! bridge into another process.

use std::fmt::Write as _;

use crossbeam_channel::Sender;
use heron_core::sensor::RangeRecord;

use crate::error::{Error, Result};

/// Destination for range snapshots
pub trait RangeSink: Send {
    /// Publish one snapshot, ordered by node then channel
    fn publish(&mut self, records: &[RangeRecord]) -> Result<()>;
}

/// Logs one line per node: `label: [cm, cm, ...]`
#[derive(Debug, Default)]
pub struct LogSink;

impl LogSink {
    pub fn new() -> Self {
        Self
    }
}

impl RangeSink for LogSink {
    fn publish(&mut self, records: &[RangeRecord]) -> Result<()> {
        for node in records.chunk_by(|a, b| a.node_id == b.node_id) {
            log::info!("{}", format_node(node));
        }
        Ok(())
    }
}

/// Format the channels of one node in centimeters, rounded to 3 decimals
fn format_node(records: &[RangeRecord]) -> String {
    let mut line = String::new();
    if let Some(first) = records.first() {
        line.push_str(&first.label);
    }
    line.push_str(": [");
    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            line.push_str(", ");
        }
        let cm = (record.range_cm() * 1000.0).round() / 1000.0;
        let _ = write!(line, "{}", cm);
    }
    line.push(']');
    line
}

/// Forwards snapshots over a crossbeam channel
pub struct ChannelSink {
    tx: Sender<Vec<RangeRecord>>,
}

impl ChannelSink {
    pub fn new(tx: Sender<Vec<RangeRecord>>) -> Self {
        Self { tx }
    }
}

impl RangeSink for ChannelSink {
    fn publish(&mut self, records: &[RangeRecord]) -> Result<()> {
        self.tx
            .send(records.to_vec())
            .map_err(|_| Error::Other("Range channel receiver dropped".into()))
    }
}
