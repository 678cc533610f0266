// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Named output instances.
//!
//! The registry is created once by whatever drives the host callbacks and
//! passed to them by reference. Registration takes the write lock; lookups
//! during flushes only take the read lock. Each registered instance runs its
//! own [`ClientService`], so instances never share a batch.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::client::LogsClient;
use crate::client_service::{ClientHandle, ClientService};
use crate::config::OutputConfig;
use crate::entry::EntrySettings;
use crate::gateway::{IngestionGateway, Outcome};
use crate::http::LmIngestGateway;

/// What a flush callback needs to process records for one instance.
#[derive(Debug, Clone)]
pub struct OutputInstance {
    pub handle: ClientHandle,
    pub settings: EntrySettings,
}

#[derive(Debug, Default)]
pub struct Registry {
    outputs: RwLock<HashMap<String, OutputInstance>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an instance that ships through the LogicMonitor HTTP API.
    pub async fn register(&self, config: &OutputConfig) -> OutputInstance {
        let gateway = Arc::new(LmIngestGateway::new(config));
        self.register_with_gateway(config, gateway).await
    }

    /// Registers an instance with an explicit gateway.
    ///
    /// An existing instance with the same id is replaced with a warning; its
    /// pending batch is flushed before its service stops.
    pub async fn register_with_gateway(
        &self,
        config: &OutputConfig,
        gateway: Arc<dyn IngestionGateway>,
    ) -> OutputInstance {
        let client = LogsClient::new(&config.id, config.size_threshold_bytes, gateway);
        let instance = OutputInstance {
            handle: ClientService::spawn(client),
            settings: config.entry_settings(),
        };

        let previous = self
            .outputs
            .write()
            .await
            .insert(config.id.clone(), instance.clone());

        if let Some(previous) = previous {
            warn!("REGISTRY | output_id {} already exists, overriding", config.id);
            retire(&previous).await;
        } else {
            debug!("REGISTRY | Registered output {}", config.id);
        }
        instance
    }

    pub async fn get(&self, id: &str) -> Option<OutputInstance> {
        self.outputs.read().await.get(id).cloned()
    }

    pub async fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.outputs.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Flushes every instance and returns the most severe outcome.
    pub async fn flush_all(&self) -> Outcome {
        let instances: Vec<OutputInstance> = self.outputs.read().await.values().cloned().collect();
        let mut outcome = Outcome::Ok;
        for instance in instances {
            outcome = outcome.worst(flush_instance(&instance).await);
        }
        outcome
    }

    /// Flushes and stops every instance, leaving the registry empty.
    pub async fn shutdown(&self) -> Outcome {
        let drained: Vec<OutputInstance> = self
            .outputs
            .write()
            .await
            .drain()
            .map(|(_, instance)| instance)
            .collect();

        let mut outcome = Outcome::Ok;
        for instance in drained {
            outcome = outcome.worst(retire(&instance).await);
        }
        debug!("REGISTRY | All outputs stopped");
        outcome
    }
}

async fn flush_instance(instance: &OutputInstance) -> Outcome {
    match instance.handle.flush().await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!("REGISTRY | {}", e);
            Outcome::Fatal
        }
    }
}

async fn retire(instance: &OutputInstance) -> Outcome {
    let outcome = flush_instance(instance).await;
    if let Err(e) = instance.handle.shutdown() {
        debug!("REGISTRY | {}", e);
    }
    outcome
}
