//! Shared test utilities for sentinel-links integration tests
//!
//! - a fake provider (Notion block api and completion api) served by axum
//!   on 127.0.0.1 with an os-assigned port
//! - json builders for Notion blocks
//! - recorded requests, for header and query assertions
#![cfg(test)]
#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use parking_lot::Mutex;
use serde_json::{Value, json};

use sentinel_links::prelude::*;

pub type TestResult<T> = anyhow::Result<T>;

/// A request received by the fake provider.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Clone, Default)]
struct FakeState {
    // block pages, served in order; page N is requested with start_cursor "cursor-N"
    pages: Arc<Vec<Vec<Value>>>,
    completion: Arc<Value>,
    failure: Option<(StatusCode, Value)>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl FakeState {
    fn record(&self, path: String, query: HashMap<String, String>, headers: HeaderMap, body: Option<Value>) {
        self.requests.lock().push(Recorded {
            path,
            query,
            headers,
            body,
        });
    }
}

/// Builder for a fake provider.
#[derive(Default)]
pub struct FakeProvider {
    state: FakeState,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks returned by the block children endpoint, one vec per page.
    pub fn block_pages(mut self, pages: Vec<Vec<Value>>) -> Self {
        self.state.pages = Arc::new(pages);
        self
    }

    /// Payload returned by the messages endpoint.
    pub fn completion(mut self, payload: Value) -> Self {
        self.state.completion = Arc::new(payload);
        self
    }

    /// Payload whose `content[0].text` is `text`.
    pub fn completion_text(self, text: &str) -> Self {
        self.completion(json!({
            "id": "msg_test",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": text}]
        }))
    }

    /// Every endpoint responds with `status` and `body`.
    pub fn fail_with(mut self, status: StatusCode, body: Value) -> Self {
        self.state.failure = Some((status, body));
        self
    }

    pub async fn spawn(self) -> TestResult<FakeServer> {
        let state = self.state;
        let requests = state.requests.clone();
        let app = Router::new()
            .route("/v1/blocks/{page_id}/children", get(block_children))
            .route("/v1/messages", post(messages))
            .with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok(FakeServer {
            url: format!("http://{addr}"),
            requests,
        })
    }
}

/// A running fake provider.
pub struct FakeServer {
    pub url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl FakeServer {
    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().clone()
    }

    /// Client configuration pointing both providers at this server.
    pub fn config(&self) -> ClientConfig {
        ClientConfig::default()
            .notion_url(&self.url)
            .completion_url(&self.url)
    }

    pub fn notion_client(&self) -> TestResult<NotionClient> {
        Ok(NotionClient::with_config(
            SecretKey::new("secret_notion_test")?,
            self.config(),
        )?)
    }

    pub fn completion_client(&self) -> TestResult<CompletionClient> {
        Ok(CompletionClient::with_config(
            SecretKey::new("sk-completion-test")?,
            self.config(),
        )?)
    }
}

async fn block_children(
    State(state): State<FakeState>,
    Path(page_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    state.record(
        format!("/v1/blocks/{page_id}/children"),
        query.clone(),
        headers,
        None,
    );
    if let Some((status, body)) = &state.failure {
        return (*status, Json(body.clone())).into_response();
    }
    let index = query
        .get("start_cursor")
        .and_then(|cursor| cursor.strip_prefix("cursor-"))
        .and_then(|n| n.parse::<usize>().ok())
        .unwrap_or(0);
    let Some(results) = state.pages.get(index) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"object": "error", "code": "validation_error", "message": "bad cursor"})),
        )
            .into_response();
    };
    let has_more = index + 1 < state.pages.len();
    let next_cursor = has_more.then(|| format!("cursor-{}", index + 1));
    Json(json!({
        "object": "list",
        "results": results,
        "next_cursor": next_cursor,
        "has_more": has_more,
    }))
    .into_response()
}

async fn messages(State(state): State<FakeState>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    state.record("/v1/messages".to_string(), HashMap::new(), headers, Some(body));
    if let Some((status, body)) = &state.failure {
        return (*status, Json(body.clone())).into_response();
    }
    Json(state.completion.as_ref().clone()).into_response()
}

// =============================================================================
// Notion block json
// =============================================================================

fn rich_text(text: &str, href: Option<&str>) -> Value {
    json!({
        "type": "text",
        "plain_text": text,
        "href": href,
        "text": {"content": text, "link": href.map(|url| json!({"url": url}))},
        "annotations": {"bold": false}
    })
}

pub fn heading(id: &str, level: u8, text: &str) -> Value {
    let block_type = format!("heading_{level}");
    let mut block = json!({
        "object": "block",
        "id": id,
        "type": block_type.clone(),
        "has_children": false
    });
    block[block_type.as_str()] = json!({"rich_text": [rich_text(text, None)], "is_toggleable": false});
    block
}

/// Paragraph made of (text, optional link) runs.
pub fn paragraph(id: &str, runs: &[(&str, Option<&str>)]) -> Value {
    let runs: Vec<Value> = runs.iter().map(|(text, href)| rich_text(text, *href)).collect();
    json!({
        "object": "block",
        "id": id,
        "type": "paragraph",
        "paragraph": {"rich_text": runs, "color": "default"}
    })
}

pub fn bookmark(id: &str, url: &str, caption: Option<&str>) -> Value {
    let caption: Vec<Value> = caption.map(|c| rich_text(c, None)).into_iter().collect();
    json!({
        "object": "block",
        "id": id,
        "type": "bookmark",
        "bookmark": {"url": url, "caption": caption}
    })
}

pub fn link_to_page(id: &str, page_id: &str) -> Value {
    json!({
        "object": "block",
        "id": id,
        "type": "link_to_page",
        "link_to_page": {"type": "page_id", "page_id": page_id}
    })
}

pub fn divider(id: &str) -> Value {
    json!({"object": "block", "id": id, "type": "divider", "divider": {}})
}
