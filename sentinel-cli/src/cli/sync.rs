use anyhow::Result;
use chrono::{DateTime, Utc};
use sentinel_links::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::cli::{AppContext, SyncArgs};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SyncReport {
    page_id: String,
    via: &'static str,
    #[serde(flatten)]
    summary: MergeSummary,
    total: usize,
    categories: usize,
    last_sync: Option<DateTime<Utc>>,
}

pub async fn handle(ctx: &AppContext, args: SyncArgs) -> Result<()> {
    let (extracted, via) = if args.direct {
        let key = SecretKey::from_option(args.notion_api_key.as_deref()).ok_or_else(|| {
            LinksError::Config {
                message: format!("--direct needs a Notion token in {NOTION_API_KEY_ENV}"),
            }
        })?;
        let client = NotionClient::new(key)?;
        let links = client.fetch_links(&args.page_id).await?;
        debug!(http = %client.http_metrics(), "notion fetch");
        (Extracted::from_links(links), "notion")
    } else {
        let relay = RelayClient::new(&ctx.relay_url)?;
        let extracted = relay.sync(&args.page_id).await?;
        debug!(http = %relay.http_metrics(), "relay fetch");
        (extracted, "relay")
    };

    // a failed fetch returns above, leaving stored state untouched
    let mut state = ctx.store.load();
    let summary = state.merge_fetched(extracted.links);
    ctx.store.save(&state)?;
    info!(
        fetched = summary.fetched,
        replaced = summary.replaced,
        retained = summary.retained,
        "sync complete"
    );

    let report = SyncReport {
        page_id: args.page_id,
        via,
        summary,
        total: state.len(),
        categories: state.categories().len(),
        last_sync: state.last_sync(),
    };
    let text = format!(
        "synced {} links ({} replaced, {} kept); {} links in {} categories",
        report.summary.fetched,
        report.summary.replaced,
        report.summary.retained,
        report.total,
        report.categories,
    );
    ctx.output.emit_text_or_json(&text, &report)
}
