// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::entry::LogEntry;
use crate::gateway::{IngestionGateway, Outcome};
use crate::resource::{Metadata, ResourceId};

pub(crate) fn entry(message: &str) -> LogEntry {
    LogEntry {
        message: message.to_string(),
        timestamp: Utc.timestamp_opt(1_700_000_000, 0).single().unwrap_or_default(),
        resource_id: ResourceId::new(),
        metadata: Metadata::new(),
    }
}

/// Records every batch it is given and answers with a fixed outcome.
#[derive(Debug, Clone)]
pub(crate) struct RecordingGateway {
    pub(crate) batches: Arc<Mutex<Vec<Vec<LogEntry>>>>,
    pub(crate) outcome: Outcome,
}

impl RecordingGateway {
    pub(crate) fn new(outcome: Outcome) -> Self {
        Self {
            batches: Arc::new(Mutex::new(Vec::new())),
            outcome,
        }
    }

    #[allow(clippy::unwrap_used)]
    pub(crate) fn sent(&self) -> Vec<Vec<String>> {
        self.batches
            .lock()
            .unwrap()
            .iter()
            .map(|batch| batch.iter().map(|e| e.message.clone()).collect())
            .collect()
    }
}

#[async_trait]
impl IngestionGateway for RecordingGateway {
    #[allow(clippy::unwrap_used)]
    async fn send(&self, batch: &[LogEntry]) -> Outcome {
        self.batches.lock().unwrap().push(batch.to_vec());
        self.outcome
    }
}
