// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use lm_logs::{
    config::OutputConfig,
    gateway::Outcome,
    processor::process_records,
    registry::Registry,
    value::{RawRecord, RawValue},
};
use mockito::{Matcher, Server};
use serde_json::json;

fn text(s: &str) -> RawValue {
    RawValue::Text(s.to_string())
}

fn config(endpoint: &str, extra: &[(&str, &str)]) -> OutputConfig {
    let endpoint = endpoint.to_string();
    let extra: Vec<(String, String)> = extra
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    OutputConfig::from_lookup(move |key| {
        if let Some((_, value)) = extra.iter().find(|(k, _)| k == key) {
            return Some(value.clone());
        }
        match key {
            "lmCompanyName" => Some("acme.logicmonitor.com".to_string()),
            "bearerToken" => Some("mock-token".to_string()),
            "endpoint" => Some(endpoint.clone()),
            _ => None,
        }
    })
    .expect("failed to build config")
}

#[tokio::test]
async fn ships_normalized_batch_with_bearer_token() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/rest/log/ingest")
        .match_header("authorization", "Bearer mock-token")
        .match_header("content-type", "application/json")
        .match_header("user-agent", "lm-logs-fluentbit/1.0.0")
        .match_body(Matcher::Json(json!([
            {
                "message": "boot ok",
                "timestamp": "2023-11-14T22:13:20Z",
                "_lm.resourceId": {"system.hostname": "h1"}
            },
            {
                "message": "fallback text",
                "timestamp": "2023-11-14T22:13:21Z",
                "_lm.resourceId": {}
            }
        ])))
        .with_status(202)
        .expect(1)
        .create_async()
        .await;

    let registry = Registry::new();
    let output = registry
        .register(&config(&format!("{}/rest", server.url()), &[]))
        .await;

    let records: Vec<(RawValue, RawRecord)> = vec![
        (
            RawValue::Null,
            vec![
                (text("message"), text("boot ok")),
                (text("host"), text("h1")),
                (text("timestamp"), RawValue::UInt(1_700_000_000)),
            ],
        ),
        (
            RawValue::Seq(vec![RawValue::UInt(1_700_000_001), RawValue::UInt(0)]),
            vec![(RawValue::Bytes(b"log".to_vec()), RawValue::Bytes(b"fallback text".to_vec()))],
        ),
        (RawValue::Null, vec![(text("message"), text(""))]),
    ];

    let summary = process_records(&mut records.into_iter(), "app.logs", &output).await;

    assert_eq!(summary.outcome, Outcome::Ok);
    assert_eq!(summary.appended, 2);
    assert_eq!(summary.dropped, 1);
    mock.assert_async().await;
    registry.shutdown().await;
}

#[tokio::test]
async fn signs_requests_with_lmv1_when_access_pair_is_set() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/rest/log/ingest")
        .match_header(
            "authorization",
            Matcher::Regex(r"^LMv1 my-id:[A-Za-z0-9+/=]+:\d{13}$".to_string()),
        )
        .with_status(202)
        .create_async()
        .await;

    let registry = Registry::new();
    let output = registry
        .register(&config(
            &format!("{}/rest", server.url()),
            &[("accessID", "my-id"), ("accessKey", "my-key")],
        ))
        .await;

    let records = vec![(RawValue::Null, vec![(text("message"), text("signed"))])];
    let summary = process_records(&mut records.into_iter(), "app.logs", &output).await;

    assert_eq!(summary.outcome, Outcome::Ok);
    mock.assert_async().await;
}

#[tokio::test]
async fn zero_threshold_sends_one_request_per_entry() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/rest/log/ingest")
        .with_status(202)
        .expect(3)
        .create_async()
        .await;

    let registry = Registry::new();
    let output = registry
        .register(&config(
            &format!("{}/rest", server.url()),
            &[("bodySizeThresholdMB", "0"), ("lmDebug", "true")],
        ))
        .await;

    let records = (1..=3).map(|i| {
        (
            RawValue::UInt(1_700_000_000),
            vec![(text("message"), text(&format!("bulk - {i}")))],
        )
    });
    let summary = process_records(&mut records.into_iter(), "app.logs", &output).await;

    assert_eq!(summary.outcome, Outcome::Ok);
    mock.assert_async().await;
}

#[tokio::test]
async fn server_errors_are_retryable_and_client_errors_fatal() {
    for (status, expected) in [
        (500, Outcome::Retryable),
        (503, Outcome::Retryable),
        (429, Outcome::Retryable),
        (403, Outcome::Fatal),
        (400, Outcome::Fatal),
    ] {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/log/ingest")
            .with_status(status)
            .with_body("error!!!")
            .expect(1)
            .create_async()
            .await;

        let registry = Registry::new();
        let output = registry
            .register(&config(&format!("{}/rest", server.url()), &[]))
            .await;

        let records = vec![(RawValue::Null, vec![(text("message"), text("test"))])];
        let summary = process_records(&mut records.into_iter(), "app.logs", &output).await;

        assert_eq!(summary.outcome, expected, "status {status}");
        // the batch is gone either way
        assert_eq!(output.handle.stats().await.expect("stats").entries, 0);
        mock.assert_async().await;
        registry.shutdown().await;
    }
}

#[tokio::test]
async fn unreachable_endpoint_is_retryable() {
    let registry = Registry::new();
    let output = registry
        .register(&config("http://127.0.0.1:1/rest", &[("flushTimeoutSecs", "2")]))
        .await;

    let records = vec![(RawValue::Null, vec![(text("message"), text("nowhere"))])];
    let summary = process_records(&mut records.into_iter(), "app.logs", &output).await;

    assert_eq!(summary.outcome, Outcome::Retryable);
}

#[tokio::test]
async fn metadata_and_mapping_reach_the_wire() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/rest/log/ingest")
        .match_body(Matcher::Json(json!([
            {
                "message": "GET /health 200",
                "timestamp": "2023-11-14T22:13:20Z",
                "_lm.resourceId": {"k8s.pod.name": "web-1"},
                "pod": "web-1",
                "kubernetes": {"namespace": "prod", "labels": ["a", "b"]}
            }
        ])))
        .with_status(202)
        .create_async()
        .await;

    let registry = Registry::new();
    let output = registry
        .register(&config(
            &format!("{}/rest", server.url()),
            &[
                ("resourceMapping", r#"{"pod":"k8s.pod.name"}"#),
                ("includeMetadata", "true"),
            ],
        ))
        .await;

    let records = vec![(
        RawValue::UInt(1_700_000_000),
        vec![
            (text("log"), RawValue::Bytes(b"GET /health 200".to_vec())),
            (text("pod"), RawValue::Bytes(b"web-1".to_vec())),
            (
                text("kubernetes"),
                RawValue::Map(vec![
                    (RawValue::Bytes(b"namespace".to_vec()), RawValue::Bytes(b"prod".to_vec())),
                    (
                        text("labels"),
                        RawValue::Seq(vec![RawValue::Bytes(b"a".to_vec()), text("b")]),
                    ),
                ]),
            ),
        ],
    )];
    let summary = process_records(&mut records.into_iter(), "app.logs", &output).await;

    assert_eq!(summary.outcome, Outcome::Ok);
    mock.assert_async().await;
}

#[tokio::test]
async fn tag_enrichment_reaches_the_wire_without_shadowing_resource_id() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/rest/log/ingest")
        .match_body(Matcher::Json(json!([
            {
                "message": "disk full",
                "timestamp": "2023-11-14T22:13:20Z",
                "_lm.resourceId": {"system.hostname": "db-1"},
                "host": "db-1",
                "fluentbit_tag": "syslog.db",
                "_resource.type": "Fluentbit"
            }
        ])))
        .with_status(202)
        .expect(1)
        .create_async()
        .await;

    let registry = Registry::new();
    let output = registry
        .register(&config(
            &format!("{}/rest", server.url()),
            &[("includeMetadata", "true"), ("tagEnrichment", "true")],
        ))
        .await;

    let records = vec![(
        RawValue::UInt(1_700_000_000),
        vec![
            (text("message"), text("disk full")),
            (text("host"), text("db-1")),
            (text("_lm.resourceId"), text("spoofed")),
        ],
    )];
    let summary = process_records(&mut records.into_iter(), "syslog.db", &output).await;

    assert_eq!(summary.outcome, Outcome::Ok);
    mock.assert_async().await;
    registry.shutdown().await;
}
