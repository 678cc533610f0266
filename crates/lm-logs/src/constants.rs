// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Defaults and limits for LogicMonitor log ingestion.

pub const MEGABYTE: usize = 1024 * 1024;

/// Body size threshold used when the configured one is missing or out of range.
pub const MAX_REQUEST_BODY_SIZE_BYTES: usize = 8 * MEGABYTE;

/// Largest accepted `bodySizeThresholdMB` value.
pub const MAX_BODY_SIZE_THRESHOLD_MB: i64 = 9;

/// Identifier used for outputs configured without an `id`.
pub const DEFAULT_OUTPUT_ID: &str = "lm_output_1";

pub const DEFAULT_LOG_SOURCE: &str = "lm-logs-fluentbit";
pub const DEFAULT_VERSION_ID: &str = "1.0.0";

/// Path appended to the `/rest` base URL for log ingestion.
pub const INGEST_PATH: &str = "/log/ingest";

pub const DEFAULT_FLUSH_TIMEOUT_SECS: u64 = 30;

/// Record fields never copied into metadata.
pub const RESERVED_FIELDS: [&str; 3] = ["message", "log", "timestamp"];

/// Wire key of the resource identity; a record field of that name is never
/// copied into metadata.
pub const RESOURCE_ID_FIELD: &str = "_lm.resourceId";

pub const HOST_FIELD: &str = "host";
pub const HOSTNAME_RESOURCE_KEY: &str = "system.hostname";

/// Record fields added when tag enrichment is on.
pub const TAG_FIELD: &str = "fluentbit_tag";
pub const RESOURCE_TYPE_FIELD: &str = "_resource.type";
pub const RESOURCE_TYPE: &str = "Fluentbit";
