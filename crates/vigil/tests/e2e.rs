// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests over a real TCP listener.

use std::net::SocketAddr;
use std::time::Duration;

use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use vigil_core::VigilError;
use vigil_gateway::PROXY_KEY_HEADER;
use vigil_test_utils::fixtures::{self, TEST_KEY};
use vigil_test_utils::TestHarness;

struct Running {
    addr: SocketAddr,
    cancel: CancellationToken,
    handle: JoinHandle<Result<(), VigilError>>,
}

async fn start(harness: &TestHarness) -> Running {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(vigil_gateway::serve(
        listener,
        harness.state(),
        cancel.clone(),
    ));
    Running {
        addr,
        cancel,
        handle,
    }
}

#[tokio::test]
async fn chat_round_trip_over_tcp() {
    let harness = TestHarness::builder()
        .with_replies(vec!["pong".into()])
        .with_redact_emails_phones(true)
        .build()
        .await
        .unwrap();
    let server = start(&harness).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{}/v1/chat.completions", server.addr))
        .header(PROXY_KEY_HEADER, TEST_KEY)
        .header("content-type", "application/json")
        .body(fixtures::chat_body("ping me at jane@example.com"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["choices"][0]["message"]["content"], "pong");
    assert_eq!(json["proxy_metadata"]["redactions"]["email"], 1);

    let calls = harness.upstream().calls().await;
    assert!(!calls[0].prompt.contains("jane@example.com"));

    let usage: Value = client
        .get(format!("http://{}/v1/usage", server.addr))
        .header(PROXY_KEY_HEADER, TEST_KEY)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(usage["day"]["requests"], 1);

    server.cancel.cancel();
    server.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn cancellation_stops_the_server() {
    let harness = TestHarness::new().await.unwrap();
    let server = start(&harness).await;

    let health = reqwest::get(format!("http://{}/health", server.addr))
        .await
        .unwrap();
    assert_eq!(health.status(), 200);

    server.cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .expect("server did not stop")
        .unwrap()
        .unwrap();
}
