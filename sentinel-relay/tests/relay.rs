//! Relay endpoints against fake providers.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{TestRelay, TestResult, notion_blocks_page, spawn_provider};
use sentinel_links::prelude::*;
use sentinel_relay::Provider;

const PAGE: &str = "11f46694-4091-8028-9320-e734a64f47c2";

#[tokio::test]
#[test_log::test]
async fn test_health() -> TestResult<()> {
    let relay = TestRelay::spawn(Provider::Completion, "http://127.0.0.1:9", None).await?;
    let response = relay.http.get(format!("{}/health", relay.url)).send().await?;
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body, json!({"status": "ok"}));
    Ok(())
}

#[tokio::test]
#[test_log::test]
async fn test_cors_allows_any_origin() -> TestResult<()> {
    let relay = TestRelay::spawn(Provider::Completion, "http://127.0.0.1:9", None).await?;
    let response = relay
        .http
        .get(format!("{}/health", relay.url))
        .header("Origin", "http://localhost:5173")
        .send()
        .await?;
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    Ok(())
}

#[tokio::test]
#[test_log::test]
async fn test_missing_key_checked_before_page_id() -> TestResult<()> {
    let relay = TestRelay::spawn(Provider::Completion, "http://127.0.0.1:9", None).await?;
    let (status, body) = relay.sync(json!({})).await?;
    assert_eq!(status, 500);
    assert_eq!(body["error"], "API key not configured on server");

    let relay = TestRelay::spawn(Provider::Notion, "http://127.0.0.1:9", None).await?;
    let (status, body) = relay.sync(json!({"notionPageId": PAGE})).await?;
    assert_eq!(status, 500);
    assert_eq!(body["error"], "Notion API key not configured on server");
    Ok(())
}

#[tokio::test]
#[test_log::test]
async fn test_missing_page_id() -> TestResult<()> {
    let relay = TestRelay::spawn(Provider::Completion, "http://127.0.0.1:9", Some("sk-test")).await?;
    for body in [json!({}), json!({"notionPageId": ""}), json!({"notionPageId": "  "})] {
        let (status, response) = relay.sync(body).await?;
        assert_eq!(status, 400);
        assert_eq!(response["error"], "Notion page ID is required");
    }
    Ok(())
}

#[tokio::test]
#[test_log::test]
async fn test_completion_payload_passed_through() -> TestResult<()> {
    let payload = json!({
        "id": "msg_1",
        "content": [{"type": "text", "text": "Tech\n<page url=\"{{https://x}}\">Hello</page>"}]
    });
    let upstream = spawn_provider(StatusCode::OK, payload.clone()).await?;
    let relay = TestRelay::spawn(Provider::Completion, &upstream, Some("sk-test")).await?;

    let (status, body) = relay.sync(json!({"notionPageId": PAGE})).await?;
    assert_eq!(status, 200);
    assert_eq!(body, payload);

    // the viewer side of the same exchange
    let extracted = RelayClient::new(&relay.url)?.sync(PAGE).await?;
    assert_eq!(extracted.len(), 1);
    assert_eq!(extracted.links[0].title, "Hello");
    assert_eq!(extracted.links[0].url, "https://x");
    assert_eq!(extracted.links[0].category, "Tech");
    Ok(())
}

#[tokio::test]
#[test_log::test]
async fn test_completion_provider_error_status() -> TestResult<()> {
    let upstream = spawn_provider(
        StatusCode::UNAUTHORIZED,
        json!({"type": "error", "error": {"type": "authentication_error", "message": "invalid x-api-key"}}),
    )
    .await?;
    let relay = TestRelay::spawn(Provider::Completion, &upstream, Some("sk-bad")).await?;

    let (status, body) = relay.sync(json!({"notionPageId": PAGE})).await?;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "Anthropic API error: 401");
    assert_eq!(body["details"]["error"]["type"], "authentication_error");
    Ok(())
}

#[tokio::test]
#[test_log::test]
async fn test_completion_unreachable_provider() -> TestResult<()> {
    let relay = TestRelay::spawn(Provider::Completion, "http://127.0.0.1:9", Some("sk-test")).await?;
    let (status, body) = relay.sync(json!({"notionPageId": PAGE})).await?;
    assert_eq!(status, 500);
    assert_eq!(body["error"], "Failed to sync with Notion");
    assert!(body["message"].is_string());
    Ok(())
}

#[tokio::test]
#[test_log::test]
async fn test_direct_returns_links_and_categories() -> TestResult<()> {
    let upstream = spawn_provider(StatusCode::OK, notion_blocks_page()).await?;
    let relay = TestRelay::spawn(Provider::Notion, &upstream, Some("secret_test")).await?;

    let (status, body) = relay.sync(json!({"notionPageId": PAGE})).await?;
    assert_eq!(status, 200);
    assert_eq!(body["total"], 1);
    assert_eq!(body["links"][0]["title"], "GPT");
    assert_eq!(body["links"][0]["category"], "AI");
    assert_eq!(body["links"][0]["source"], "notion");
    assert_eq!(body["categories"]["AI"][0]["title"], "GPT");

    let extracted = RelayClient::new(&relay.url)?.sync(PAGE).await?;
    assert_eq!(extracted.len(), 1);
    assert!(extracted.links[0].is_fetched());
    Ok(())
}

#[tokio::test]
#[test_log::test]
async fn test_direct_provider_failure() -> TestResult<()> {
    let upstream = spawn_provider(
        StatusCode::NOT_FOUND,
        json!({"object": "error", "status": 404, "code": "object_not_found", "message": "Could not find block"}),
    )
    .await?;
    let relay = TestRelay::spawn(Provider::Notion, &upstream, Some("secret_test")).await?;

    let (status, body) = relay.sync(json!({"notionPageId": PAGE})).await?;
    assert_eq!(status, 500);
    assert_eq!(body["error"], "Failed to fetch from Notion");
    assert_eq!(body["code"], "object_not_found");
    assert_eq!(body["message"], "Could not find block");

    let err = RelayClient::new(&relay.url)?
        .sync(PAGE)
        .await
        .expect_err("relay failure");
    assert_eq!(err.provider_status(), Some(500));
    assert!(err.to_string().contains("Failed to fetch from Notion: Could not find block"));
    Ok(())
}
