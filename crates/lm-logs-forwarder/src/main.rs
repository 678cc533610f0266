// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

mod env_config;
mod input;

use std::env;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use lm_logs::{
    config::parse_bool,
    gateway::Outcome,
    processor::process_records,
    registry::{OutputInstance, Registry},
};

const DEFAULT_FLUSH_INTERVAL_SECS: u64 = 5;
const DEFAULT_MAX_PENDING_RECORDS: usize = 1000;
const DEFAULT_INPUT_TAG: &str = "stdin";

#[tokio::main]
pub async fn main() {
    let debug_enabled = env::var("LM_DEBUG")
        .ok()
        .and_then(|val| parse_bool(&val))
        .unwrap_or(false);
    let log_level = if debug_enabled {
        "debug".to_string()
    } else {
        env::var("LM_LOG_LEVEL")
            .map(|val| val.to_lowercase())
            .unwrap_or("info".to_string())
    };

    let env_filter = format!("h2=off,hyper=off,rustls=off,{}", log_level);

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(env_filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install log subscriber: {e}");
    }

    let flush_interval = env::var("LM_FLUSH_INTERVAL_SECS")
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_FLUSH_INTERVAL_SECS);
    let max_pending = env::var("LM_MAX_PENDING_RECORDS")
        .ok()
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(DEFAULT_MAX_PENDING_RECORDS);
    let tag = env::var("LM_INPUT_TAG")
        .ok()
        .filter(|val| !val.is_empty())
        .unwrap_or(DEFAULT_INPUT_TAG.to_string());

    let config = match env_config::output_config_from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("failed to initialize output configuration: {e}");
            std::process::exit(1);
        }
    };

    let registry = Registry::new();
    let output = registry.register(&config).await;
    info!(
        "Forwarding stdin to {} as output {}, flushing every {}s",
        config.endpoint, config.id, flush_interval
    );

    let cancel_token = CancellationToken::new();
    let ctrl_c_token = cancel_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Received interrupt, finishing up");
        }
        ctrl_c_token.cancel();
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut flush_ticker = interval(Duration::from_secs(flush_interval));
    flush_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    flush_ticker.tick().await;

    let mut pending = input::RecordBuffer::new(max_pending);
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match input::parse_line(&line) {
                        Ok(record) => {
                            if pending.push(record) {
                                flush(&mut pending, &tag, &output).await;
                            }
                        }
                        Err(e) => warn!("Skipping input line: {e}"),
                    }
                }
                Ok(None) => {
                    debug!("Reached end of input");
                    break;
                }
                Err(e) => {
                    error!("Failed to read input: {e}");
                    break;
                }
            },
            _ = flush_ticker.tick() => {
                flush(&mut pending, &tag, &output).await;
            }
            () = cancel_token.cancelled() => {
                break;
            }
        }
    }

    flush(&mut pending, &tag, &output).await;
    if registry.shutdown().await != Outcome::Ok {
        warn!("Some logs could not be delivered on shutdown");
    }
}

async fn flush(pending: &mut input::RecordBuffer, tag: &str, output: &OutputInstance) {
    if pending.is_empty() {
        return;
    }
    let mut records = pending.take().into_iter();
    let summary = process_records(&mut records, tag, output).await;
    match summary.outcome {
        Outcome::Ok => debug!(
            "Flushed {} records, dropped {}",
            summary.appended, summary.dropped
        ),
        Outcome::Retryable => warn!(
            "Flush of {} records hit a transient ingestion failure",
            summary.appended
        ),
        Outcome::Fatal => error!(
            "Flush of {} records was rejected by ingestion",
            summary.appended
        ),
    }
}
