// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Batching client for one output instance.
//!
//! The client accumulates entries and hands a full batch to its
//! [`IngestionGateway`] whenever the next entry would cross the size
//! threshold, or when asked to flush. A batch is attempted once: it is cleared
//! whatever the gateway reports, and the outcome is passed back to the caller.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::aggregator::Aggregator;
use crate::entry::LogEntry;
use crate::gateway::{IngestionGateway, Outcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Idle,
    Accumulating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientStats {
    pub state: ClientState,
    pub entries: usize,
    pub current_size: usize,
    pub size_threshold: usize,
    /// Batches handed to the gateway so far.
    pub batches_sent: u64,
}

pub struct LogsClient {
    id: String,
    aggregator: Aggregator,
    gateway: Arc<dyn IngestionGateway>,
    batches_sent: u64,
}

impl LogsClient {
    pub fn new(id: &str, size_threshold: usize, gateway: Arc<dyn IngestionGateway>) -> Self {
        LogsClient {
            id: id.to_string(),
            aggregator: Aggregator::new(size_threshold),
            gateway,
            batches_sent: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Adds an entry, first flushing if it would push the batch over the threshold.
    ///
    /// The entry is always kept. The returned outcome is that of the
    /// threshold flush, or [`Outcome::Ok`] when none happened.
    pub async fn append(&mut self, entry: LogEntry) -> Outcome {
        let entry_size = entry.serialized_size();
        let outcome = if self.aggregator.would_overflow(entry_size) {
            self.flush().await
        } else {
            Outcome::Ok
        };

        debug!("LOGS | {} adding log to the bulk: {} bytes", self.id, entry_size);
        self.aggregator.push(entry, entry_size);
        outcome
    }

    /// Sends the pending batch, if any, and empties it.
    pub async fn flush(&mut self) -> Outcome {
        if self.aggregator.is_empty() {
            return Outcome::Ok;
        }

        let batch = self.aggregator.take();
        debug!("LOGS | {} sending bulk of length {}", self.id, batch.len());
        self.batches_sent += 1;

        let outcome = self.gateway.send(&batch).await;
        match outcome {
            Outcome::Ok => debug!("LOGS | {} flushed {} logs", self.id, batch.len()),
            Outcome::Retryable => warn!(
                "LOGS | {} failed to send {} logs, the flush can be retried",
                self.id,
                batch.len()
            ),
            Outcome::Fatal => error!(
                "LOGS | {} failed to send {} logs, batch dropped",
                self.id,
                batch.len()
            ),
        }
        outcome
    }

    pub fn stats(&self) -> ClientStats {
        ClientStats {
            state: if self.aggregator.is_empty() {
                ClientState::Idle
            } else {
                ClientState::Accumulating
            },
            entries: self.aggregator.len(),
            current_size: self.aggregator.current_size(),
            size_threshold: self.aggregator.size_threshold(),
            batches_sent: self.batches_sent,
        }
    }
}
