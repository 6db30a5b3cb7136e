//! Shared test utilities for relay integration tests
//!
//! - spawns the relay router on 127.0.0.1 with an os-assigned port
//! - a fake upstream provider (Notion blocks and completion messages)
#![cfg(test)]
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};

use sentinel_links::prelude::*;
use sentinel_relay::{Provider, RelayConfig, RelayState, router};

pub type TestResult<T> = anyhow::Result<T>;

async fn spawn_router(app: Router) -> TestResult<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

/// Fake provider: every request gets `status` and `body`.
#[derive(Clone)]
struct Canned {
    status: StatusCode,
    body: Arc<Value>,
}

async fn canned(State(canned): State<Canned>) -> Response {
    (canned.status, Json(canned.body.as_ref().clone())).into_response()
}

/// Starts a fake provider answering both the block and messages endpoints.
pub async fn spawn_provider(status: StatusCode, body: Value) -> TestResult<String> {
    let app = Router::new()
        .route("/v1/blocks/{page_id}/children", get(canned))
        .route("/v1/messages", post(canned))
        .with_state(Canned {
            status,
            body: Arc::new(body),
        });
    spawn_router(app).await
}

/// A running relay.
pub struct TestRelay {
    pub url: String,
    pub http: reqwest::Client,
}

impl TestRelay {
    /// Starts a relay for `provider`, pointed at `upstream`, with `key` configured if given.
    pub async fn spawn(provider: Provider, upstream: &str, key: Option<&str>) -> TestResult<Self> {
        let key = SecretKey::from_option(key);
        let config = RelayConfig {
            provider,
            completion_key: if provider == Provider::Completion { key.clone() } else { None },
            notion_key: if provider == Provider::Notion { key } else { None },
            client: ClientConfig::default()
                .notion_url(upstream)
                .completion_url(upstream),
        };
        let url = spawn_router(router(RelayState::new(config)?)).await?;
        Ok(Self {
            url,
            http: reqwest::Client::new(),
        })
    }

    /// Posts `body` to the sync endpoint; returns status and json body.
    pub async fn sync(&self, body: Value) -> TestResult<(u16, Value)> {
        let response = self
            .http
            .post(format!("{}/api/sync-notion", self.url))
            .json(&body)
            .send()
            .await?;
        let status = response.status().as_u16();
        Ok((status, response.json().await?))
    }
}

pub fn notion_blocks_page() -> Value {
    json!({
        "object": "list",
        "results": [
            {"object": "block", "id": "h", "type": "heading_1",
             "heading_1": {"rich_text": [{"plain_text": "AI", "href": null}]}},
            {"object": "block", "id": "p", "type": "paragraph",
             "paragraph": {"rich_text": [{"plain_text": "GPT", "href": "https://gpt"}]}}
        ],
        "next_cursor": null,
        "has_more": false
    })
}
