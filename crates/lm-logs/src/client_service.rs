// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Single-writer task owning a [`LogsClient`].
//!
//! Hosts may flush the same output from several threads at once. Every call
//! goes through a [`ClientHandle`] and is applied by one task, in order, so
//! the batch order and size counter never race.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

use crate::client::{ClientStats, LogsClient};
use crate::entry::LogEntry;
use crate::errors::ServiceError;
use crate::gateway::Outcome;

#[derive(Debug)]
pub enum ClientCommand {
    Append(LogEntry, oneshot::Sender<Outcome>),
    Flush(oneshot::Sender<Outcome>),
    Stats(oneshot::Sender<ClientStats>),
    Shutdown,
}

#[derive(Clone, Debug)]
pub struct ClientHandle {
    id: String,
    tx: mpsc::UnboundedSender<ClientCommand>,
}

impl ClientHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn append(&self, entry: LogEntry) -> Result<Outcome, ServiceError> {
        let (response_tx, response_rx) = oneshot::channel();
        self.send(ClientCommand::Append(entry, response_tx))?;
        response_rx.await.map_err(|_| self.closed())
    }

    pub async fn flush(&self) -> Result<Outcome, ServiceError> {
        let (response_tx, response_rx) = oneshot::channel();
        self.send(ClientCommand::Flush(response_tx))?;
        response_rx.await.map_err(|_| self.closed())
    }

    pub async fn stats(&self) -> Result<ClientStats, ServiceError> {
        let (response_tx, response_rx) = oneshot::channel();
        self.send(ClientCommand::Stats(response_tx))?;
        response_rx.await.map_err(|_| self.closed())
    }

    /// Stops the service. Pending entries are dropped; flush first to keep them.
    pub fn shutdown(&self) -> Result<(), ServiceError> {
        self.send(ClientCommand::Shutdown)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn send(&self, command: ClientCommand) -> Result<(), ServiceError> {
        self.tx.send(command).map_err(|_| self.closed())
    }

    fn closed(&self) -> ServiceError {
        ServiceError::Closed(self.id.clone())
    }
}

pub struct ClientService {
    client: LogsClient,
    rx: mpsc::UnboundedReceiver<ClientCommand>,
}

impl ClientService {
    #[must_use]
    pub fn new(client: LogsClient) -> (Self, ClientHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = ClientHandle {
            id: client.id().to_string(),
            tx,
        };
        (Self { client, rx }, handle)
    }

    /// Spawns the service on the current runtime.
    pub fn spawn(client: LogsClient) -> ClientHandle {
        let (service, handle) = Self::new(client);
        tokio::spawn(service.run());
        handle
    }

    pub async fn run(mut self) {
        debug!("LOGS | Client service {} started", self.client.id());

        while let Some(command) = self.rx.recv().await {
            match command {
                ClientCommand::Append(entry, response_tx) => {
                    let outcome = self.client.append(entry).await;
                    if response_tx.send(outcome).is_err() {
                        error!("Failed to send append response - receiver dropped");
                    }
                }
                ClientCommand::Flush(response_tx) => {
                    let outcome = self.client.flush().await;
                    if response_tx.send(outcome).is_err() {
                        error!("Failed to send flush response - receiver dropped");
                    }
                }
                ClientCommand::Stats(response_tx) => {
                    if response_tx.send(self.client.stats()).is_err() {
                        error!("Failed to send stats response - receiver dropped");
                    }
                }
                ClientCommand::Shutdown => {
                    debug!("LOGS | Client service {} shutting down", self.client.id());
                    break;
                }
            }
        }

        debug!("LOGS | Client service {} stopped", self.client.id());
    }
}
