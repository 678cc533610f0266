// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Output instance configuration.
//!
//! Keys are looked up by name through a caller-supplied function so the same
//! parsing serves plugin config blocks and environment variables alike. An
//! empty value is treated as absent.

use std::fmt::Debug;
use std::time::Duration;

use tracing::debug;

use crate::constants::{
    DEFAULT_FLUSH_TIMEOUT_SECS, DEFAULT_LOG_SOURCE, DEFAULT_OUTPUT_ID, DEFAULT_VERSION_ID,
    MAX_BODY_SIZE_THRESHOLD_MB, MAX_REQUEST_BODY_SIZE_BYTES, MEGABYTE,
};
use crate::entry::EntrySettings;
use crate::errors::ConfigError;
use crate::resource::FieldMapping;

pub const KEY_ID: &str = "id";
pub const KEY_COMPANY_NAME: &str = "lmCompanyName";
pub const KEY_ACCESS_ID: &str = "accessID";
pub const KEY_ACCESS_KEY: &str = "accessKey";
pub const KEY_BEARER_TOKEN: &str = "bearerToken";
pub const KEY_RESOURCE_MAPPING: &str = "resourceMapping";
pub const KEY_INCLUDE_METADATA: &str = "includeMetadata";
pub const KEY_BODY_SIZE_THRESHOLD: &str = "bodySizeThresholdMB";
pub const KEY_DEBUG: &str = "lmDebug";
pub const KEY_LOG_SOURCE: &str = "logSource";
pub const KEY_VERSION_ID: &str = "versionId";
pub const KEY_ENDPOINT: &str = "endpoint";
pub const KEY_FLUSH_TIMEOUT: &str = "flushTimeoutSecs";
pub const KEY_TAG_ENRICHMENT: &str = "tagEnrichment";

/// Every key understood by [`OutputConfig::from_lookup`].
pub const ALL_KEYS: [&str; 14] = [
    KEY_ID,
    KEY_COMPANY_NAME,
    KEY_ACCESS_ID,
    KEY_ACCESS_KEY,
    KEY_BEARER_TOKEN,
    KEY_RESOURCE_MAPPING,
    KEY_INCLUDE_METADATA,
    KEY_BODY_SIZE_THRESHOLD,
    KEY_DEBUG,
    KEY_LOG_SOURCE,
    KEY_VERSION_ID,
    KEY_ENDPOINT,
    KEY_FLUSH_TIMEOUT,
    KEY_TAG_ENRICHMENT,
];

#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// LMv1 HMAC signing with an API token pair.
    Lmv1 {
        access_id: String,
        access_key: String,
    },
    Bearer(String),
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Lmv1 { access_id, .. } => f
                .debug_struct("Lmv1")
                .field("access_id", access_id)
                .field("access_key", &"[REDACTED]")
                .finish(),
            Credentials::Bearer(_) => f.debug_tuple("Bearer").field(&"[REDACTED]").finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub id: String,
    pub company_name: String,
    pub credentials: Credentials,
    pub resource_mapping: FieldMapping,
    pub include_metadata: bool,
    /// Add `fluentbit_tag` and `_resource.type` to every record.
    pub tag_enrichment: bool,
    pub size_threshold_bytes: usize,
    pub debug: bool,
    pub log_source: String,
    pub version_id: String,
    /// Base URL of the REST API; `/log/ingest` is appended to it.
    pub endpoint: String,
    pub flush_timeout: Duration,
}

impl OutputConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<OutputConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let debug = get(KEY_DEBUG)
            .and_then(|value| parse_bool(&value))
            .unwrap_or(false);

        let id = get(KEY_ID).unwrap_or_else(|| {
            debug!("LOGS | Using default id: {DEFAULT_OUTPUT_ID}");
            DEFAULT_OUTPUT_ID.to_string()
        });

        let company_name = get(KEY_COMPANY_NAME).ok_or(ConfigError::MissingCompanyName)?;

        let credentials = match (get(KEY_ACCESS_ID), get(KEY_ACCESS_KEY)) {
            (Some(access_id), Some(access_key)) => Credentials::Lmv1 {
                access_id,
                access_key,
            },
            _ => {
                debug!("LOGS | accessID or accessKey is empty, using bearer token for authentication");
                Credentials::Bearer(get(KEY_BEARER_TOKEN).ok_or(ConfigError::MissingCredentials)?)
            }
        };

        let endpoint = match get(KEY_ENDPOINT) {
            Some(endpoint) => {
                if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                    return Err(ConfigError::InvalidEndpoint(endpoint));
                }
                endpoint.trim_end_matches('/').to_string()
            }
            None => format!("https://{company_name}/rest"),
        };

        let flush_timeout = get(KEY_FLUSH_TIMEOUT)
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(DEFAULT_FLUSH_TIMEOUT_SECS);

        Ok(OutputConfig {
            id,
            company_name,
            credentials,
            resource_mapping: get(KEY_RESOURCE_MAPPING)
                .map(|raw| FieldMapping::parse(&raw))
                .unwrap_or_default(),
            include_metadata: get(KEY_INCLUDE_METADATA)
                .and_then(|value| parse_bool(&value))
                .unwrap_or(false),
            tag_enrichment: get(KEY_TAG_ENRICHMENT)
                .and_then(|value| parse_bool(&value))
                .unwrap_or(false),
            size_threshold_bytes: body_size_threshold(get(KEY_BODY_SIZE_THRESHOLD).as_deref()),
            debug,
            log_source: get(KEY_LOG_SOURCE).unwrap_or_else(|| DEFAULT_LOG_SOURCE.to_string()),
            version_id: get(KEY_VERSION_ID).unwrap_or_else(|| DEFAULT_VERSION_ID.to_string()),
            endpoint,
            flush_timeout: Duration::from_secs(flush_timeout),
        })
    }

    pub fn entry_settings(&self) -> EntrySettings {
        EntrySettings {
            resource_mapping: self.resource_mapping.clone(),
            include_metadata: self.include_metadata,
            tag_enrichment: self.tag_enrichment,
            debug: self.debug,
        }
    }

    pub fn user_agent(&self) -> String {
        format!("{}/{}", self.log_source, self.version_id)
    }
}

/// Accepts the same spellings as Go's `strconv.ParseBool`.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Converts `bodySizeThresholdMB` to bytes.
///
/// 0 through 9 are accepted (0 sends every entry on its own); anything else
/// falls back to the 8MB default instead of failing configuration.
pub fn body_size_threshold(value: Option<&str>) -> usize {
    let threshold = match value.map(|v| v.trim().parse::<i64>()) {
        None => MAX_REQUEST_BODY_SIZE_BYTES,
        Some(Ok(mb)) if (0..=MAX_BODY_SIZE_THRESHOLD_MB).contains(&mb) => mb as usize * MEGABYTE,
        Some(_) => {
            debug!("LOGS | Falling back to the default BodySizeThreshold");
            MAX_REQUEST_BODY_SIZE_BYTES
        }
    };
    debug!("LOGS | Setting BodySizeThreshold to {threshold}");
    threshold
}
