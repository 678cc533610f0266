// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Loosely-typed collector records and their canonical JSON form.
//!
//! Collectors hand over records as msgpack-like trees whose keys are not
//! guaranteed to be text and whose strings often arrive as raw byte blobs.
//! [`normalize`] rewrites such a tree into a [`Record`] that serializes to the
//! JSON the ingestion API expects:
//!
//! - byte blobs become text, so they are not base64-escaped downstream
//! - nested maps recurse, with every key coerced to text
//! - sequences recurse element by element, keeping their order
//! - every other scalar passes through unchanged

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Number, Value};

use crate::errors::NormalizeError;

/// A single value of a raw collector record.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    /// Event time already decoded by the collector.
    Instant(DateTime<Utc>),
    Seq(Vec<RawValue>),
    /// Key/value pairs in wire order. Keys may be of any kind.
    Map(Vec<(RawValue, RawValue)>),
}

/// Top level of a raw collector record.
pub type RawRecord = Vec<(RawValue, RawValue)>;

/// A normalized record: text keys, JSON values.
pub type Record = Map<String, Value>;

impl RawValue {
    pub fn kind(&self) -> &'static str {
        match self {
            RawValue::Null => "null",
            RawValue::Bool(_) => "bool",
            RawValue::Int(_) | RawValue::UInt(_) => "integer",
            RawValue::Float(_) => "float",
            RawValue::Text(_) => "text",
            RawValue::Bytes(_) => "bytes",
            RawValue::Instant(_) => "instant",
            RawValue::Seq(_) => "sequence",
            RawValue::Map(_) => "map",
        }
    }
}

/// Rewrites a raw record into its canonical form.
///
/// Fails only when some key, at any depth, cannot be read as text. Duplicate
/// keys keep the last value seen.
pub fn normalize(raw: RawRecord) -> Result<Record, NormalizeError> {
    let mut record = Map::new();
    for (key, value) in raw {
        record.insert(key_to_text(key)?, normalize_value(value)?);
    }
    Ok(record)
}

/// Rewrites a single raw value into a JSON value.
pub fn normalize_value(value: RawValue) -> Result<Value, NormalizeError> {
    Ok(match value {
        RawValue::Null => Value::Null,
        RawValue::Bool(b) => Value::Bool(b),
        RawValue::Int(i) => Value::Number(i.into()),
        RawValue::UInt(u) => Value::Number(u.into()),
        // JSON has no NaN or infinities
        RawValue::Float(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        RawValue::Text(s) => Value::String(s),
        RawValue::Bytes(bytes) => Value::String(bytes_to_text(bytes)),
        RawValue::Instant(ts) => Value::String(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        RawValue::Seq(items) => Value::Array(
            items
                .into_iter()
                .map(normalize_value)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        RawValue::Map(pairs) => Value::Object(normalize(pairs)?),
    })
}

fn key_to_text(key: RawValue) -> Result<String, NormalizeError> {
    match key {
        RawValue::Text(s) => Ok(s),
        RawValue::Bytes(bytes) => {
            String::from_utf8(bytes).map_err(|_| NormalizeError::MalformedKey("bytes"))
        }
        other => Err(NormalizeError::MalformedKey(other.kind())),
    }
}

fn bytes_to_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => RawValue::Null,
            Value::Bool(b) => RawValue::Bool(b),
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    RawValue::UInt(u)
                } else if let Some(i) = n.as_i64() {
                    RawValue::Int(i)
                } else {
                    RawValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => RawValue::Text(s),
            Value::Array(items) => RawValue::Seq(items.into_iter().map(RawValue::from).collect()),
            Value::Object(map) => RawValue::Map(
                map.into_iter()
                    .map(|(k, v)| (RawValue::Text(k), RawValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}
