// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The transport seam between batching and the remote ingestion API.

use async_trait::async_trait;

use crate::entry::LogEntry;

/// Result of handing one batch to the transport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Outcome {
    #[default]
    Ok,
    /// Transient failure; the host should retry the flush.
    Retryable,
    /// The batch is undeliverable and was discarded.
    Fatal,
}

impl Outcome {
    /// The more severe of two outcomes.
    #[must_use]
    pub fn worst(self, other: Outcome) -> Outcome {
        self.max(other)
    }

    pub fn is_ok(self) -> bool {
        self == Outcome::Ok
    }
}

/// Accepts a batch and reports how delivery went.
///
/// Implementations own any transport concerns: framing, authentication and
/// timeouts. Retries are left to whoever receives the [`Outcome`].
#[async_trait]
pub trait IngestionGateway: Send + Sync {
    async fn send(&self, batch: &[LogEntry]) -> Outcome;
}
