// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Size-bounded batch of log entries.
//!
//! Size accounting is approximate: each entry counts for its JSON length plus
//! one byte, with no allowance for the enclosing array. The threshold exists
//! to bound request size, not to enforce an exact byte cap.

use crate::constants::MAX_REQUEST_BODY_SIZE_BYTES;
use crate::entry::LogEntry;

#[derive(Debug, Clone)]
pub struct Aggregator {
    /// Entries in insertion order, which is also send order.
    pub(crate) entries: Vec<LogEntry>,
    /// Accumulated size; only ever grows until [`Aggregator::take`] resets it.
    pub(crate) current_size: usize,
    pub(crate) size_threshold: usize,
}

impl Default for Aggregator {
    fn default() -> Self {
        Aggregator::new(MAX_REQUEST_BODY_SIZE_BYTES)
    }
}

impl Aggregator {
    #[must_use]
    pub fn new(size_threshold: usize) -> Self {
        Aggregator {
            entries: Vec::new(),
            current_size: 0,
            size_threshold,
        }
    }

    /// Whether adding an entry of `entry_size` bytes would cross the threshold.
    pub fn would_overflow(&self, entry_size: usize) -> bool {
        self.current_size + entry_size + 1 > self.size_threshold
    }

    /// Appends unconditionally; an oversized entry still fits an empty batch.
    pub fn push(&mut self, entry: LogEntry, entry_size: usize) {
        self.current_size += entry_size + 1;
        self.entries.push(entry);
    }

    /// Empties the batch and resets the size counter.
    pub fn take(&mut self) -> Vec<LogEntry> {
        self.current_size = 0;
        std::mem::take(&mut self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current_size(&self) -> usize {
        self.current_size
    }

    pub fn size_threshold(&self) -> usize {
        self.size_threshold
    }
}
