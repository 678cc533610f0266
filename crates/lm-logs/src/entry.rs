// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Log entries as shipped to LogicMonitor, and their assembly from raw records.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::constants::{RESOURCE_TYPE, RESOURCE_TYPE_FIELD, TAG_FIELD};
use crate::errors::DropReason;
use crate::resource::{self, FieldMapping, Metadata, ResourceId};
use crate::timestamp::{resolve_timestamp, resolve_timestamp_at, Resolution};
use crate::value::{self, RawRecord, RawValue};

/// One normalized log line. `message` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "_lm.resourceId")]
    pub resource_id: ResourceId,
    #[serde(flatten)]
    pub metadata: Metadata,
}

impl LogEntry {
    /// Length of the entry's JSON encoding.
    ///
    /// Used for batch size accounting; it ignores the separators and brackets
    /// of the enclosing array, so it slightly under-counts the wire size.
    pub fn serialized_size(&self) -> usize {
        serde_json::to_vec(self).map_or(self.message.len(), |bytes| bytes.len())
    }
}

/// Per-output knobs used to turn records into entries.
#[derive(Debug, Clone, Default)]
pub struct EntrySettings {
    pub resource_mapping: FieldMapping,
    pub include_metadata: bool,
    /// Adds the flush tag and the collector resource type to every record.
    pub tag_enrichment: bool,
    /// Log record payloads while processing them.
    pub debug: bool,
}

/// Builds an entry from a raw record flushed under `tag`.
///
/// A parseable top-level `timestamp` in the record wins over `event_ts`, the
/// time the collector attached to the event. An unparseable one is ignored.
pub fn build_entry(
    event_ts: &RawValue,
    tag: &str,
    raw: RawRecord,
    settings: &EntrySettings,
) -> Result<LogEntry, DropReason> {
    let record_ts = raw
        .iter()
        .rev()
        .find(|(key, _)| is_timestamp_key(key))
        .map(|(_, value)| resolve_timestamp_at(value, Utc::now()));
    let timestamp = match record_ts {
        Some(Resolution::Parsed(ts)) => ts,
        _ => resolve_timestamp(event_ts),
    };

    let mut record = value::normalize(raw)?;
    if settings.tag_enrichment {
        record.insert(TAG_FIELD.to_string(), Value::String(tag.to_string()));
        record.insert(
            RESOURCE_TYPE_FIELD.to_string(),
            Value::String(RESOURCE_TYPE.to_string()),
        );
    }
    if settings.debug {
        debug!("LOGS | Log received: {}", serde_json::Value::Object(record.clone()));
    }

    let message = match resource::resolve_message(&record) {
        Some(message) if !message.is_empty() => message.to_string(),
        _ => return Err(DropReason::MissingMessage),
    };

    let (resource_id, metadata) = resource::extract(
        &record,
        &settings.resource_mapping,
        settings.include_metadata,
    );

    Ok(LogEntry {
        message,
        timestamp,
        resource_id,
        metadata,
    })
}

fn is_timestamp_key(key: &RawValue) -> bool {
    match key {
        RawValue::Text(k) => k == "timestamp",
        RawValue::Bytes(k) => k.as_slice() == b"timestamp",
        _ => false,
    }
}
