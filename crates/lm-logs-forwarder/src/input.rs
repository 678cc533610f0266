// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Newline-delimited JSON input.
//!
//! Each line is either a bare record object or a `[timestamp, record]` pair
//! as collectors emit them. Bare records get a null event time, which the
//! timestamp resolver turns into "now" unless the record has its own.

use lm_logs::value::{RawRecord, RawValue};
use serde_json::Value;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum LineError {
    #[error("invalid JSON: {0}")]
    Json(String),
    #[error("expected an object or a [timestamp, object] pair")]
    NotARecord,
}

pub fn parse_line(line: &str) -> Result<(RawValue, RawRecord), LineError> {
    let value: Value = serde_json::from_str(line).map_err(|e| LineError::Json(e.to_string()))?;
    match value {
        Value::Object(_) => Ok((RawValue::Null, into_record(value)?)),
        Value::Array(mut pair) if pair.len() == 2 && pair[1].is_object() => {
            let record = pair.pop().map(into_record).ok_or(LineError::NotARecord)??;
            let ts = pair.pop().map(RawValue::from).unwrap_or(RawValue::Null);
            Ok((ts, record))
        }
        _ => Err(LineError::NotARecord),
    }
}

/// Records read since the last flush.
///
/// `push` reports when `capacity` is reached so a burst of input is flushed
/// early instead of waiting for the next tick.
#[derive(Debug)]
pub struct RecordBuffer {
    records: Vec<(RawValue, RawRecord)>,
    capacity: usize,
}

impl RecordBuffer {
    pub fn new(capacity: usize) -> Self {
        RecordBuffer {
            records: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Buffers a record and returns whether the buffer is now full.
    pub fn push(&mut self, record: (RawValue, RawRecord)) -> bool {
        self.records.push(record);
        self.records.len() >= self.capacity
    }

    pub fn take(&mut self) -> Vec<(RawValue, RawRecord)> {
        std::mem::take(&mut self.records)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn into_record(value: Value) -> Result<RawRecord, LineError> {
    match RawValue::from(value) {
        RawValue::Map(pairs) => Ok(pairs),
        _ => Err(LineError::NotARecord),
    }
}
