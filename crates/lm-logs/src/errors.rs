// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Error types shared across the logs pipeline.

/// Fatal problems found while building an output instance from its configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("LM company name is not specified. Please specify lmCompanyName in the configuration")]
    MissingCompanyName,

    #[error("no usable credentials: either accessID and accessKey or bearerToken must be specified")]
    MissingCredentials,

    #[error("invalid ingestion endpoint {0}")]
    InvalidEndpoint(String),
}

/// Raised when a record cannot be rewritten into its canonical form.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("record key of kind {0} cannot be used as text")]
    MalformedKey(&'static str),
}

/// Why a record did not make it into a batch.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DropReason {
    #[error(transparent)]
    MalformedKey(#[from] NormalizeError),

    #[error("no message or log field in the record")]
    MissingMessage,
}

/// Failures talking to a client service task.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("client service for {0} is closed")]
    Closed(String),
}
