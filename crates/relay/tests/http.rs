//! HTTP transport tests against mock servers.

use std::sync::Arc;

use parley_core::conversation::Role;
use parley_core::relay_client::RelayConnector;
use parley_relay::RelayConfigBuilder;
use parley_relay::client::HttpRelayConnector;
use parley_relay::proto::create_request;
use parley_relay::upstream::{ChatUpstream, HttpUpstream, UpstreamError};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_upstream(template: ResponseTemplate) -> (MockServer, HttpUpstream) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(template)
        .mount(&server)
        .await;
    let config = Arc::new(
        RelayConfigBuilder::with_api_key("test-key")
            .with_base_url(server.uri())
            .build(),
    );
    let upstream = HttpUpstream::new(config);
    (server, upstream)
}

#[tokio::test]
async fn test_upstream_success_trims_the_reply() {
    let (_server, upstream) = mock_upstream(
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "  Hello there.  " } }]
        })),
    )
    .await;

    let config = RelayConfigBuilder::with_api_key("test-key").build();
    let request = create_request("hi", &[], &config);
    let reply = upstream.complete(&request).await.unwrap();
    assert_eq!(reply, "Hello there.");
}

#[tokio::test]
async fn test_upstream_surfaces_the_status_and_detail() {
    let (_server, upstream) = mock_upstream(
        ResponseTemplate::new(503).set_body_string("overloaded"),
    )
    .await;

    let config = RelayConfigBuilder::with_api_key("test-key").build();
    let request = create_request("hi", &[], &config);
    let err = upstream.complete(&request).await.unwrap_err();
    match err {
        UpstreamError::Status { status, detail } => {
            assert_eq!(status, 503);
            assert_eq!(detail, "overloaded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_upstream_rejects_a_payload_without_choices() {
    let (_server, upstream) = mock_upstream(
        ResponseTemplate::new(200).set_body_json(json!({})),
    )
    .await;

    let config = RelayConfigBuilder::with_api_key("test-key").build();
    let request = create_request("hi", &[], &config);
    let err = upstream.complete(&request).await.unwrap_err();
    assert!(matches!(err, UpstreamError::MalformedPayload));
}

#[tokio::test]
async fn test_upstream_sends_the_customer_id_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("customerId", "ops@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "ack" } }]
        })))
        .mount(&server)
        .await;

    let config = Arc::new(
        RelayConfigBuilder::with_api_key("test-key")
            .with_customer_id("ops@example.com")
            .with_base_url(server.uri())
            .build(),
    );
    let upstream = HttpUpstream::new(Arc::clone(&config));
    let request = create_request("hi", &[], &config);
    assert_eq!(upstream.complete(&request).await.unwrap(), "ack");
}

#[tokio::test]
async fn test_connector_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/assist"))
        .and(body_partial_json(json!({
            "message": "hi",
            "conversationHistory": [
                { "role": "assistant", "content": "Hello" }
            ],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "General greetings.",
            "success": true,
        })))
        .mount(&server)
        .await;

    let connector = HttpRelayConnector::new(server.uri());
    let reply = connector
        .send_message("hi", &[(Role::Assistant, "Hello".to_owned())])
        .await
        .unwrap();
    assert_eq!(reply, "General greetings.");
}

#[tokio::test]
async fn test_connector_carries_the_relay_error_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/assist"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": "Failed to get AI response",
        })))
        .mount(&server)
        .await;

    let connector = HttpRelayConnector::new(server.uri());
    let err = connector.send_message("hi", &[]).await.unwrap_err();
    assert_eq!(err.message(), "Failed to get AI response");
}

#[tokio::test]
async fn test_connector_rejects_an_unsuccessful_turn() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/assist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
        })))
        .mount(&server)
        .await;

    let connector = HttpRelayConnector::new(server.uri());
    assert!(connector.send_message("hi", &[]).await.is_err());
}
