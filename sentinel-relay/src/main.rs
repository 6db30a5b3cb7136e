/*
 * sentinel-relay - fetch Notion pages for the sentinel link viewer
 *
 * SPDX-License-Identifier: Apache-2.0
 */
#![warn(clippy::pedantic)] // experimental
#![allow(clippy::missing_errors_doc)] // pedantic
#![allow(clippy::must_use_candidate)] // pedantic
#![warn(clippy::uninlined_format_args)]

use std::net::{IpAddr, SocketAddr};

use anyhow::{Context, Result};
use clap::Parser;
use sentinel_links::prelude::*;
use sentinel_relay::{DEFAULT_PORT, Provider, RelayConfig, RelayState, router};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "sentinel-relay")]
#[command(author, version, about = "sentinel-relay: fetch Notion pages for the sentinel link viewer", long_about = None)]
struct Cli {
    /// Listen port
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Listen address
    #[arg(long, env = "SENTINEL_HOST", default_value = "127.0.0.1")]
    host: IpAddr,

    /// Where page content comes from
    #[arg(long, env = "SENTINEL_PROVIDER", value_enum, default_value_t = Provider::Completion)]
    provider: Provider,

    /// Completion api key (provider = completion)
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    anthropic_api_key: Option<String>,

    /// Notion integration token (provider = notion)
    #[arg(long, env = "NOTION_API_KEY", hide_env_values = true)]
    notion_api_key: Option<String>,

    /// Verbose mode (repeat for more: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = RelayConfig {
        provider: cli.provider,
        completion_key: SecretKey::from_option(cli.anthropic_api_key.as_deref()),
        notion_key: SecretKey::from_option(cli.notion_api_key.as_deref()),
        client: ClientConfig::default(),
    };
    let state = RelayState::new(config)?;

    let addr = SocketAddr::new(cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, provider = %state.provider(), "sentinel relay listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    info!("sentinel relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    // if the handler cannot be installed, run until killed
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = std::env::var("RUST_LOG").map_or_else(
        |_| {
            let level = match verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            };
            EnvFilter::new(level)
        },
        EnvFilter::new,
    );

    fmt().with_env_filter(filter).init();
}
