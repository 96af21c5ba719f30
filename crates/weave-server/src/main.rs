//! weave-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! local SQLite store, optionally fronts it with a remote record server, and
//! serves the story API over HTTP.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use axum::Router;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use weave_core::fallback::FallbackStore;
use weave_server::ServerConfig;
use weave_store_remote::RemoteStore;
use weave_store_sqlite::SqliteStore;

#[derive(Parser)]
#[command(author, version, about = "Story Weave server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Ignore `remote_url` and serve from the local store only.
  #[arg(long)]
  local_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg =
    ServerConfig::load(&cli.config).context("failed to load ServerConfig")?;

  let store_path = server_cfg.store_path();
  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  let local = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let remote = if cli.local_only { None } else { server_cfg.remote() };

  let app = match remote {
    Some(remote_cfg) => {
      tracing::info!(
        remote = %remote_cfg.base_url,
        timeout_ms = server_cfg.remote_timeout_ms,
        "using remote store with local fallback",
      );
      let remote = RemoteStore::new(remote_cfg).context("failed to build remote client")?;
      let store = FallbackStore::new(remote, local, server_cfg.fallback_policy());
      weave_server::router(Arc::new(store))
    }
    None => {
      tracing::info!(path = ?store_path, "using local store only");
      weave_server::router(Arc::new(local))
    }
  };

  serve(app, &server_cfg.address()).await
}

async fn serve(app: Router, address: &str) -> anyhow::Result<()> {
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
