use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use sentinel_links::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::{
    cli::{AddArgs, AppContext, DeleteArgs, ListArgs},
    output::CategoryRow,
};

pub fn list(ctx: &AppContext, args: ListArgs) -> Result<()> {
    let state = ctx.store.load();
    let mut filter = LinkFilter::default();
    if let Some(search) = args.search {
        filter = filter.search(search);
    }
    if let Some(category) = args.category {
        filter = filter.category(category);
    }
    ctx.output.emit_table(&state.filtered(&filter))
}

pub fn categories(ctx: &AppContext) -> Result<()> {
    let state = ctx.store.load();
    let rows: Vec<CategoryRow> = state
        .category_counts()
        .into_iter()
        .map(|(name, count)| CategoryRow {
            name: name.to_string(),
            count,
        })
        .collect();
    ctx.output.emit_table(&rows)
}

pub fn add(ctx: &AppContext, args: AddArgs) -> Result<()> {
    let mut state = ctx.store.load();
    let new_link = NewLink::new(
        args.title.unwrap_or_default(),
        args.url.unwrap_or_default(),
        args.category.unwrap_or_default(),
    );
    let link = state.add_link(new_link)?.clone();
    ctx.store.save(&state)?;
    info!(id = %link.id, category = %link.category, "added");
    ctx.output.emit_table(&[link])
}

pub fn delete(ctx: &AppContext, args: &DeleteArgs) -> Result<()> {
    let mut state = ctx.store.load();
    if let Some(link) = state.find(&args.id)
        && !link.is_deletable()
        && !args.force
    {
        bail!(
            "link {} has source {}; only hand-added links can be deleted (use --force to override)",
            link.id,
            link.source
        );
    }
    let link = state.delete_link(&args.id)?;
    ctx.store.save(&state)?;
    info!(id = %link.id, "deleted");
    ctx.output.emit_table(&[link])
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusReport {
    links: usize,
    categories: usize,
    last_sync: Option<DateTime<Utc>>,
    store: String,
}

pub fn status(ctx: &AppContext) -> Result<()> {
    let state = ctx.store.load();
    let report = StatusReport {
        links: state.len(),
        categories: state.categories().len(),
        last_sync: state.last_sync(),
        store: ctx.store.store().path(STORAGE_KEY).display().to_string(),
    };
    let last_sync = report
        .last_sync
        .map_or_else(|| "never".to_string(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string());
    let text = format!(
        "{} links in {} categories\nlast sync: {last_sync}\nstore: {}",
        report.links, report.categories, report.store
    );
    ctx.output.emit_text_or_json(&text, &report)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::output::{Output, OutputFormat};

    fn context(dir: &std::path::Path) -> AppContext {
        AppContext {
            store: LinkStore::new(FileStore::new(dir)),
            output: Output::new(OutputFormat::Json, Some(dir.join("out.json"))),
            relay_url: "http://127.0.0.1:9".to_string(),
        }
    }

    fn output(dir: &std::path::Path) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&fs::read_to_string(dir.join("out.json"))?)?)
    }

    #[test]
    fn test_add_then_delete() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let ctx = context(dir.path());
        add(
            &ctx,
            AddArgs {
                title: Some("Mine".into()),
                url: Some("https://mine".into()),
                category: Some("Personal".into()),
            },
        )?;
        let added = output(dir.path())?;
        let id = added[0]["id"].as_str().unwrap_or_default().to_string();
        assert_eq!(added[0]["source"], "local");
        assert_eq!(ctx.store.load().len(), SyncState::sample().len() + 1);

        delete(&ctx, &DeleteArgs { id, force: false })?;
        assert_eq!(ctx.store.load().len(), SyncState::sample().len());
        assert!(ctx.store.load().categories().get("Personal").is_none());
        Ok(())
    }

    #[test]
    fn test_add_missing_fields_is_validation_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let ctx = context(dir.path());
        let err = add(
            &ctx,
            AddArgs {
                title: Some("Mine".into()),
                url: None,
                category: Some(" ".into()),
            },
        )
        .expect_err("missing fields");
        assert!(matches!(
            err.downcast_ref::<LinksError>(),
            Some(LinksError::Validation { .. })
        ));
        assert!(ctx.store.load_stored()?.is_none(), "nothing saved");
        Ok(())
    }

    #[test]
    fn test_delete_sample_needs_force() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let ctx = context(dir.path());
        let id = ctx.store.load().links()[0].id.to_string();

        let refused = delete(
            &ctx,
            &DeleteArgs {
                id: id.clone(),
                force: false,
            },
        );
        assert!(refused.is_err());
        assert_eq!(ctx.store.load().len(), SyncState::sample().len());
        delete(&ctx, &DeleteArgs { id, force: true })?;
        assert_eq!(ctx.store.load().len(), SyncState::sample().len() - 1);
        Ok(())
    }

    #[test]
    fn test_list_filter() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let ctx = context(dir.path());
        list(
            &ctx,
            ListArgs {
                search: Some("ROBOT".into()),
                category: Some("all".into()),
            },
        )?;
        let listed = output(dir.path())?;
        let titles: Vec<&str> = listed
            .as_array()
            .map(|items| items.iter().filter_map(|l| l["title"].as_str()).collect())
            .unwrap_or_default();
        assert_eq!(titles, vec!["Robots", "Robot", "Humanoid Robotics"]);
        Ok(())
    }

    #[test]
    fn test_unknown_id_not_found() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let ctx = context(dir.path());
        let err = delete(
            &ctx,
            &DeleteArgs {
                id: "nope".into(),
                force: false,
            },
        )
        .expect_err("unknown id");
        assert!(matches!(
            err.downcast_ref::<LinksError>(),
            Some(LinksError::NotFound { .. })
        ));
        Ok(())
    }
}
