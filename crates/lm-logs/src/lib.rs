// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Normalizes collector log records and ships them to LogicMonitor in
//! size-bounded batches.
//!
//! ```text
//!   (ts, raw record) ──> value::normalize ──> entry::build_entry ──> ClientHandle::append
//!                                                                        │
//!                           threshold crossed or explicit flush ─────────┘
//!                                                                        v
//!                                                        IngestionGateway::send
//! ```

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod aggregator;
pub mod client;
pub mod client_service;
pub mod config;
pub mod constants;
pub mod entry;
pub mod errors;
pub mod gateway;
pub mod http;
pub mod processor;
pub mod registry;
pub mod resource;
pub mod timestamp;
pub mod value;

#[cfg(test)]
pub(crate) mod test_support;
