// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Resource identity, metadata and message extraction from normalized records.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::constants::{HOSTNAME_RESOURCE_KEY, HOST_FIELD, RESERVED_FIELDS, RESOURCE_ID_FIELD};
use crate::value::Record;

/// Source record field -> destination resource attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping(BTreeMap<String, String>);

impl FieldMapping {
    pub fn new(mapping: BTreeMap<String, String>) -> Self {
        Self(mapping)
    }

    /// Parses a JSON object of field names.
    ///
    /// A missing or malformed mapping is not fatal: it degrades to an empty
    /// mapping so the host hostname fallback still applies.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::default();
        }
        match serde_json::from_str::<BTreeMap<String, String>>(raw) {
            Ok(mapping) => Self(mapping),
            Err(e) => {
                error!("LOGS | Failed to parse resourceMapping {raw:?}, using empty mapping: {e}");
                Self::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

/// Attributes identifying the system a log belongs to.
pub type ResourceId = Map<String, Value>;

/// Auxiliary record fields carried next to the message.
pub type Metadata = Map<String, Value>;

/// Derives the resource identity and, optionally, the metadata of a record.
pub fn extract(
    record: &Record,
    mapping: &FieldMapping,
    include_metadata: bool,
) -> (ResourceId, Metadata) {
    let mut resource_id = ResourceId::new();
    for (source, destination) in mapping.iter() {
        if destination.is_empty() {
            continue;
        }
        if let Some(value) = record.get(source) {
            resource_id.insert(destination.clone(), value.clone());
        }
    }

    if resource_id.is_empty() {
        if let Some(Value::String(host)) = record.get(HOST_FIELD) {
            if !host.is_empty() {
                resource_id.insert(
                    HOSTNAME_RESOURCE_KEY.to_string(),
                    Value::String(host.clone()),
                );
            }
        }
    }

    let metadata = if include_metadata {
        metadata(record)
    } else {
        Metadata::new()
    };

    (resource_id, metadata)
}

/// Copies every top-level field except `message`, `log` and `timestamp`.
///
/// `_lm.resourceId` is skipped too: metadata is flattened next to the
/// resource identity on the wire and must not shadow it.
pub fn metadata(record: &Record) -> Metadata {
    record
        .iter()
        .filter(|(key, _)| {
            !RESERVED_FIELDS.contains(&key.as_str()) && key.as_str() != RESOURCE_ID_FIELD
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Picks the log line: `message` when it is text, otherwise `log` when it is text.
///
/// An empty text still wins; callers treat an empty result as no message.
pub fn resolve_message(record: &Record) -> Option<&str> {
    if let Some(Value::String(message)) = record.get("message") {
        debug!("LOGS | Message field found");
        return Some(message.as_str());
    }
    if let Some(Value::String(log)) = record.get("log") {
        debug!("LOGS | Log field found");
        return Some(log.as_str());
    }
    None
}
