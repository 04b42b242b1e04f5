// csvstrip-core/src/sinks/forwarder.rs
//! Pipelines redacted fields from the synchronous scan into an async store.
//!
//! The scan runs on a blocking thread and pushes into a bounded channel
//! through [`ChannelSink`]. A single [`SinkForwarder`] task drains the
//! channel and awaits each store update before taking the next one, so the
//! store observes records in scan order, one update per record.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{debug, error, info};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::redacted_field::RedactedField;
use crate::sink::FieldSink;

/// Default number of fields buffered between the scan and the store.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// An external keyed store receiving redacted fields.
#[async_trait]
pub trait RecordStore: Send + Sync {
    fn name(&self) -> &str;

    /// Applies one update; returns the number of rows affected.
    async fn update(&self, field: &RedactedField) -> Result<u64>;
}

/// The scan-side half of the queue.
///
/// `forward` blocks while the queue is full, so it must not be called from
/// inside an async task. Run the scan under `tokio::task::spawn_blocking`.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<RedactedField>,
}

impl FieldSink for ChannelSink {
    fn forward(&mut self, field: RedactedField) -> Result<()> {
        self.tx
            .blocking_send(field)
            .map_err(|e| anyhow!("Forwarding queue closed before line {} was sent", e.0.line_number))
    }
}

/// Outcome of draining the queue into a store.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ForwardReport {
    pub updated: u64,
    pub rows_affected: u64,
    pub failed: u64,
}

pub struct SinkForwarder {
    store: Arc<dyn RecordStore>,
}

impl SinkForwarder {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Creates the bounded queue between a scan and a forwarder.
    pub fn channel(capacity: usize) -> (ChannelSink, mpsc::Receiver<RedactedField>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (ChannelSink { tx }, rx)
    }

    /// Spawns the drain loop on the current runtime.
    pub fn spawn(self, rx: mpsc::Receiver<RedactedField>) -> JoinHandle<ForwardReport> {
        tokio::spawn(async move { self.run(rx).await })
    }

    /// Drains `rx` until every sender is dropped. Store errors are logged and
    /// counted; they never stop the drain.
    pub async fn run(&self, mut rx: mpsc::Receiver<RedactedField>) -> ForwardReport {
        let mut report = ForwardReport::default();
        while let Some(field) = rx.recv().await {
            match self.store.update(&field).await {
                Ok(rows) => {
                    debug!("{}: updated {} rows for line {}", self.store.name(), rows, field.line_number);
                    report.updated += 1;
                    report.rows_affected += rows;
                }
                Err(e) => {
                    error!("{}: update for line {} failed: {:#}", self.store.name(), field.line_number, e);
                    report.failed += 1;
                }
            }
        }
        info!(
            "{}: forwarded {} fields ({} rows affected, {} failed)",
            self.store.name(),
            report.updated,
            report.rows_affected,
            report.failed
        );
        report
    }
}
