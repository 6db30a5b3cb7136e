/*
 * sentinel - sync, search, and curate links from a Notion page
 *
 * SPDX-License-Identifier: Apache-2.0
 */
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use sentinel_links::prelude::*;
use tracing::{debug, warn};

use crate::output::{Output, OutputFormat};

pub mod links;
pub mod sync;

/// Relay used by `sync` unless `--direct` is given.
const DEFAULT_RELAY_URL: &str = "http://localhost:3001";

/// Subdirectory of the platform data directory holding the link store
const DATA_SUBDIR: &str = "sentinel";

#[derive(Parser, Debug)]
#[command(name = "sentinel")]
#[command(author, version, about = "sentinel: sync, search, and curate links from a Notion page", long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Relay url. Default: environment `SENTINEL_RELAY_URL` or <http://localhost:3001>
    #[arg(short = 'u', long, env = "SENTINEL_RELAY_URL", default_value = DEFAULT_RELAY_URL)]
    pub relay_url: String,

    /// Directory holding the link store. Default: `$XDG_DATA_HOME/sentinel`
    #[arg(long, env = "SENTINEL_DATA_DIR", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Write output to file (default: stdout)
    #[arg(short = 'o', long, value_name = "FILE", global = true)]
    pub output: Option<PathBuf>,

    /// JSON output (default)
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Table output format
    #[arg(short, long, global = true)]
    pub table: bool,

    /// Quiet mode - suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (repeat for more: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch the Notion page and merge its links into the store
    Sync(SyncArgs),

    /// List links, optionally filtered
    #[command(alias = "ls")]
    List(ListArgs),

    /// List categories with link counts
    Categories,

    /// Add a link by hand
    Add(AddArgs),

    /// Delete a hand-added link
    #[command(alias = "rm")]
    Delete(DeleteArgs),

    /// Show link count, category count, and last sync time
    Status,
}

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Notion page to sync
    #[arg(long, env = NOTION_PAGE_ID_ENV, default_value = DEFAULT_NOTION_PAGE_ID)]
    pub page_id: String,

    /// Read the page from the Notion api instead of the relay
    #[arg(long)]
    pub direct: bool,

    /// Notion integration token, for --direct
    #[arg(long, env = NOTION_API_KEY_ENV, hide_env_values = true)]
    pub notion_api_key: Option<String>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Text matched against title or category (case-insensitive)
    #[arg(short, long)]
    pub search: Option<String>,

    /// Category to show, or "all"
    #[arg(short, long)]
    pub category: Option<String>,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub url: Option<String>,

    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Link id
    pub id: String,

    /// Delete even if the link was not added by hand
    #[arg(long)]
    pub force: bool,
}

pub struct AppContext {
    pub store: LinkStore<FileStore>,
    pub output: Output,
    pub relay_url: String,
}

pub async fn run(cli: Cli) -> Result<()> {
    let output = Output::new(resolve_output_format(&cli), cli.output.clone());
    let data_dir = resolve_data_dir(cli.data_dir.clone());
    debug!(data_dir = %data_dir.display(), "link store");

    let ctx = AppContext {
        store: LinkStore::new(FileStore::new(data_dir)),
        output,
        relay_url: cli.relay_url,
    };

    match cli.command {
        Commands::Sync(args) => sync::handle(&ctx, args).await,
        Commands::List(args) => links::list(&ctx, args),
        Commands::Categories => links::categories(&ctx),
        Commands::Add(args) => links::add(&ctx, args),
        Commands::Delete(args) => links::delete(&ctx, &args),
        Commands::Status => links::status(&ctx),
    }
}

fn resolve_output_format(cli: &Cli) -> OutputFormat {
    if cli.quiet {
        OutputFormat::Quiet
    } else if cli.pretty {
        if cli.table {
            warn!("--pretty conflicts with --table. Using json pretty format");
        }
        OutputFormat::Pretty
    } else if cli.json {
        if cli.table {
            warn!("--json conflicts with --table. Using json format");
        }
        OutputFormat::Json
    } else if cli.table {
        OutputFormat::Table
    } else {
        OutputFormat::Json
    }
}

fn resolve_data_dir(data_dir: Option<PathBuf>) -> PathBuf {
    data_dir.unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DATA_SUBDIR)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("parse")
    }

    #[test]
    fn test_output_format() {
        assert_eq!(
            resolve_output_format(&parse(&["sentinel", "list"])),
            OutputFormat::Json
        );
        assert_eq!(
            resolve_output_format(&parse(&["sentinel", "list", "--table"])),
            OutputFormat::Table
        );
        assert_eq!(
            resolve_output_format(&parse(&["sentinel", "--pretty", "-t", "list"])),
            OutputFormat::Pretty
        );
        assert_eq!(
            resolve_output_format(&parse(&["sentinel", "-q", "status"])),
            OutputFormat::Quiet
        );
    }

    #[test]
    fn test_explicit_data_dir() {
        assert_eq!(
            resolve_data_dir(Some(PathBuf::from("/tmp/links"))),
            PathBuf::from("/tmp/links")
        );
        assert!(resolve_data_dir(None).ends_with(DATA_SUBDIR));
    }

    #[test]
    fn test_delete_args() {
        let cli = parse(&["sentinel", "delete", "abc", "--force"]);
        match cli.command {
            Commands::Delete(args) => {
                assert_eq!(args.id, "abc");
                assert!(args.force);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
