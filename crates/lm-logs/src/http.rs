// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! HTTP transport to the LogicMonitor log ingestion API.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use sha2::Sha256;
use tracing::{debug, error};

use crate::config::{Credentials, OutputConfig};
use crate::constants::INGEST_PATH;
use crate::entry::LogEntry;
use crate::gateway::{IngestionGateway, Outcome};

type HmacSha256 = Hmac<Sha256>;

#[must_use]
pub fn get_client(timeout: Duration) -> reqwest::Client {
    match reqwest::Client::builder()
        .timeout(timeout)
        .pool_idle_timeout(Some(Duration::from_secs(270)))
        .tcp_keepalive(Some(Duration::from_secs(120)))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            error!("LOGS | Failed to build HTTP client: {}, using reqwest defaults", e);
            reqwest::Client::new()
        }
    }
}

/// Posts batches as JSON arrays to `{endpoint}/log/ingest`.
#[derive(Debug, Clone)]
pub struct LmIngestGateway {
    client: reqwest::Client,
    url: String,
    credentials: Credentials,
    user_agent: String,
}

impl LmIngestGateway {
    #[must_use]
    pub fn new(config: &OutputConfig) -> Self {
        LmIngestGateway {
            client: get_client(config.flush_timeout),
            url: format!("{}{}", config.endpoint, INGEST_PATH),
            credentials: config.credentials.clone(),
            user_agent: config.user_agent(),
        }
    }

    fn headers(&self, body: &[u8]) -> Result<HeaderMap, String> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.user_agent).map_err(|e| e.to_string())?,
        );
        let authorization = match &self.credentials {
            Credentials::Bearer(token) => format!("Bearer {token}"),
            Credentials::Lmv1 {
                access_id,
                access_key,
            } => {
                let epoch_ms = chrono::Utc::now().timestamp_millis();
                lmv1_authorization(access_id, access_key, epoch_ms, body)?
            }
        };
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&authorization).map_err(|e| e.to_string())?,
        );
        Ok(headers)
    }
}

/// Builds an `LMv1 id:signature:epoch` authorization value.
///
/// The signature is the base64 of the hex HMAC-SHA256 of
/// `POST{epoch}{body}/log/ingest`, keyed by the access key.
pub fn lmv1_authorization(
    access_id: &str,
    access_key: &str,
    epoch_ms: i64,
    body: &[u8],
) -> Result<String, String> {
    let mut mac = HmacSha256::new_from_slice(access_key.as_bytes())
        .map_err(|e| format!("invalid access key: {e}"))?;
    mac.update(b"POST");
    mac.update(epoch_ms.to_string().as_bytes());
    mac.update(body);
    mac.update(INGEST_PATH.as_bytes());
    let digest = hex::encode(mac.finalize().into_bytes());
    let signature = base64::engine::general_purpose::STANDARD.encode(digest);
    Ok(format!("LMv1 {access_id}:{signature}:{epoch_ms}"))
}

/// Maps an HTTP status to a delivery outcome.
pub fn outcome_for_status(status: StatusCode) -> Outcome {
    if status.is_success() {
        Outcome::Ok
    } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        Outcome::Retryable
    } else {
        Outcome::Fatal
    }
}

#[async_trait]
impl IngestionGateway for LmIngestGateway {
    async fn send(&self, batch: &[LogEntry]) -> Outcome {
        let body = match serde_json::to_vec(batch) {
            Ok(body) => body,
            Err(e) => {
                error!("LOGS | Failed to serialize batch. Data dropped: {}", e);
                return Outcome::Fatal;
            }
        };
        let headers = match self.headers(&body) {
            Ok(headers) => headers,
            Err(e) => {
                error!("LOGS | Failed to build request headers. Data dropped: {}", e);
                return Outcome::Fatal;
            }
        };

        let resp = self
            .client
            .post(&self.url)
            .headers(headers)
            .body(body)
            .send()
            .await;

        match resp {
            Ok(resp) => {
                let status = resp.status();
                let outcome = outcome_for_status(status);
                if outcome.is_ok() {
                    debug!("LOGS | Response received from LM Log Ingest: {}", status);
                } else {
                    error!(
                        "LOGS | {}: Failed to push to LM Log Ingest: {:?}",
                        status,
                        resp.text().await.unwrap_or_default()
                    );
                }
                outcome
            }
            Err(e) => {
                error!("LOGS | Error in sending logs to LM: {}", e);
                if e.is_builder() {
                    Outcome::Fatal
                } else {
                    Outcome::Retryable
                }
            }
        }
    }
}
