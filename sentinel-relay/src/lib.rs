/*
 * Sentinel Links
 *
 * SPDX-License-Identifier: Apache-2.0
 */
//! # Sentinel relay
//!
//! HTTP relay between the link viewer and the content providers. Api keys
//! stay on the server; the viewer only sends a page id.
//!
//! - `GET /health` returns `{"status":"ok"}`
//! - `POST /api/sync-notion` with `{"notionPageId": "..."}` fetches the page
//!
//! The sync endpoint runs in one of two modes, chosen at startup:
//!
//! - [`Provider::Completion`]: asks a completion model for the page text and
//!   returns the provider's payload unchanged
//! - [`Provider::Notion`]: reads the page's blocks from the Notion api and
//!   returns `{links, categories, total}`
//!
//! A missing key is reported per request (500), so the relay starts without one.
//!
#![allow(clippy::missing_errors_doc)] // pedantic
#![allow(clippy::must_use_candidate)] // pedantic
#![warn(clippy::doc_markdown)]
#![warn(clippy::explicit_iter_loop)]
#![warn(clippy::implicit_clone)]
#![warn(clippy::redundant_clone)]
#![warn(clippy::uninlined_format_args)]
#![warn(clippy::unused_async)]

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use sentinel_links::{
    prelude::*,
    relay_client::{SYNC_PATH, SyncRequest, SyncResponse},
};

/// Default listen port
pub const DEFAULT_PORT: u16 = 3001;

/// Where the sync endpoint gets page content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Provider {
    /// Completion model with a Notion fetch tool (needs ANTHROPIC_API_KEY)
    #[default]
    Completion,
    /// Notion block api (needs NOTION_API_KEY)
    Notion,
}

/// Relay settings.
#[derive(Debug, Clone, Default)]
pub struct RelayConfig {
    pub provider: Provider,
    pub completion_key: Option<SecretKey>,
    pub notion_key: Option<SecretKey>,
    pub client: ClientConfig,
}

// provider client, or None if its key was not configured
#[derive(Debug)]
enum Upstream {
    Completion(Option<CompletionClient>),
    Notion(Option<NotionClient>),
}

/// Shared, read-only state of the relay handlers.
#[derive(Debug, Clone)]
pub struct RelayState {
    upstream: Arc<Upstream>,
}

impl RelayState {
    pub fn new(config: RelayConfig) -> Result<Self, LinksError> {
        let upstream = match config.provider {
            Provider::Completion => Upstream::Completion(
                config
                    .completion_key
                    .map(|key| CompletionClient::with_config(key, config.client))
                    .transpose()?,
            ),
            Provider::Notion => Upstream::Notion(
                config
                    .notion_key
                    .map(|key| NotionClient::with_config(key, config.client))
                    .transpose()?,
            ),
        };
        let state = Self {
            upstream: Arc::new(upstream),
        };
        if !state.has_key() {
            warn!(provider = %state.provider(), "no api key configured; sync requests will fail");
        }
        Ok(state)
    }

    pub fn provider(&self) -> Provider {
        match self.upstream.as_ref() {
            Upstream::Completion(_) => Provider::Completion,
            Upstream::Notion(_) => Provider::Notion,
        }
    }

    /// True if the selected provider has a key.
    pub fn has_key(&self) -> bool {
        match self.upstream.as_ref() {
            Upstream::Completion(client) => client.is_some(),
            Upstream::Notion(client) => client.is_some(),
        }
    }
}

/// Routes of the relay, with permissive CORS.
pub fn router(state: RelayState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(SYNC_PATH, post(sync_notion))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// An error response: status and json body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: Value,
}

impl ApiError {
    fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    fn missing_key(message: &str) -> Self {
        error!("{message}");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": message }))
    }

    fn missing_page_id() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            json!({ "error": "Notion page ID is required" }),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// The body is parsed here rather than by an extractor so that a missing or
// malformed body is reported as a missing page id, after the key check.
async fn sync_notion(State(state): State<RelayState>, body: Bytes) -> Result<Response, ApiError> {
    match state.upstream.as_ref() {
        Upstream::Completion(client) => sync_completion(client.as_ref(), &body).await,
        Upstream::Notion(client) => sync_direct(client.as_ref(), &body).await,
    }
}

fn requested_page_id(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<SyncRequest>(body)
        .ok()
        .map(|request| request.notion_page_id.trim().to_string())
        .filter(|page_id| !page_id.is_empty())
}

async fn sync_completion(
    client: Option<&CompletionClient>,
    body: &[u8],
) -> Result<Response, ApiError> {
    let client = client.ok_or_else(|| ApiError::missing_key("API key not configured on server"))?;
    let page_id = requested_page_id(body).ok_or_else(ApiError::missing_page_id)?;
    info!(page_id = %page_id, "sync via completion");

    match client.fetch_page_content(&page_id).await {
        Ok(payload) => Ok(Json(payload).into_response()),
        Err(LinksError::Provider {
            code,
            message,
            details,
            ..
        }) => {
            error!(code, "completion api error");
            let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY);
            Err(ApiError::new(
                status,
                json!({
                    "error": format!("Anthropic API error: {code}"),
                    "details": details.unwrap_or(Value::String(message)),
                }),
            ))
        }
        Err(e) => {
            error!("Error syncing with Notion: {e}");
            Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Failed to sync with Notion", "message": e.to_string() }),
            ))
        }
    }
}

async fn sync_direct(client: Option<&NotionClient>, body: &[u8]) -> Result<Response, ApiError> {
    let client =
        client.ok_or_else(|| ApiError::missing_key("Notion API key not configured on server"))?;
    let page_id = requested_page_id(body).ok_or_else(ApiError::missing_page_id)?;
    info!(page_id = %page_id, "sync via notion api");

    match client.fetch_links(&page_id).await {
        Ok(links) => Ok(Json(SyncResponse::new(links)).into_response()),
        Err(LinksError::Validation { message }) => Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            json!({ "error": message }),
        )),
        Err(e) => {
            error!("Error fetching from Notion: {e}");
            Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "Failed to fetch from Notion",
                    "code": e.provider_code(),
                    "status": e.provider_status(),
                    "message": provider_message(&e),
                }),
            ))
        }
    }
}

// the provider's own message, if it sent one
fn provider_message(err: &LinksError) -> String {
    match err {
        LinksError::Provider {
            details: Some(details),
            ..
        } => details
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| err.to_string(), str::to_string),
        _ => err.to_string(),
    }
}
