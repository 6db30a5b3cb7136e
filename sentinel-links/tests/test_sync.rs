//! Fetch, merge, persist, and reload, end to end.

mod common;

use common::{FakeProvider, TestResult, heading, paragraph};
use sentinel_links::prelude::*;

#[tokio::test]
#[test_log::test]
async fn test_sync_keeps_local_links_across_restarts() -> TestResult<()> {
    let dir = tempfile::tempdir()?;
    let server = FakeProvider::new()
        .block_pages(vec![vec![
            heading("h1", 1, "Robotics"),
            paragraph("p1", &[("Robots", Some("https://robots"))]),
        ]])
        .spawn()
        .await?;
    let client = server.notion_client()?;

    // first run: sample data, one local link, then a sync
    let store = LinkStore::new(FileStore::new(dir.path()));
    let mut state = store.load();
    assert_eq!(state.len(), SyncState::sample().len());
    state.add_link(NewLink::new("Mine", "https://mine", "Personal"))?;
    let summary = state.merge_fetched(client.fetch_links("page").await?);
    store.save(&state)?;
    assert_eq!(summary.fetched, 1);
    assert!(state.last_sync().is_some());

    // second run: state comes back from disk
    let store = LinkStore::new(FileStore::new(dir.path()));
    let reloaded = store.load();
    assert_eq!(reloaded, state);
    reloaded.check_consistency().map_err(anyhow::Error::msg)?;
    assert_eq!(reloaded.links()[0].title, "Robots");
    assert!(reloaded.links().iter().any(|l| l.title == "Mine"));

    // syncing again replaces the fetched link instead of duplicating it
    let mut state = reloaded;
    state.merge_fetched(client.fetch_links("page").await?);
    let robots = state.links().iter().filter(|l| l.title == "Robots").count();
    assert_eq!(robots, 1);
    Ok(())
}

#[tokio::test]
#[test_log::test]
async fn test_sync_from_empty_store() -> TestResult<()> {
    let dir = tempfile::tempdir()?;
    let server = FakeProvider::new()
        .block_pages(vec![vec![
            heading("h1", 1, "AI"),
            paragraph("p1", &[("GPT", Some("https://openai.com"))]),
        ]])
        .spawn()
        .await?;
    let client = server.notion_client()?;

    let store = LinkStore::new(FileStore::new(dir.path()));
    store
        .store()
        .set(STORAGE_KEY, r#"{"links":[],"categories":{},"lastSync":null}"#)?;
    let mut state = store.load();
    assert!(state.is_empty());

    state.merge_fetched(client.fetch_links("page").await?);
    store.save(&state)?;

    let reloaded = LinkStore::new(FileStore::new(dir.path())).load();
    assert_eq!(reloaded, state);
    assert_eq!(reloaded.len(), 1);
    let gpt = &reloaded.links()[0];
    assert_eq!(gpt.title, "GPT");
    assert_eq!(gpt.url, "https://openai.com");
    assert_eq!(gpt.category, "AI");
    assert_eq!(gpt.source, Source::Notion);
    assert_eq!(reloaded.categories().names().collect::<Vec<_>>(), vec!["AI"]);
    assert_eq!(reloaded.categories().get("AI"), Some(std::slice::from_ref(gpt)));
    Ok(())
}
