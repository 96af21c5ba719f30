//! Story Weave server: configuration and application assembly.
//!
//! The binary in `main.rs` only parses flags, initialises logging and binds
//! the listener; everything testable lives here.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use axum::Router;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use weave_core::{
  StoryService,
  fallback::{DEFAULT_REMOTE_TIMEOUT, FallbackPolicy},
  store::StoryStore,
};
use weave_store_remote::RemoteConfig;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` layered with
/// `WEAVE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:              String,
  pub port:              u16,
  /// SQLite file used as the local store. `~/` is expanded.
  pub store_path:        PathBuf,
  /// Base URL of a remote record server. Without it the local store is the
  /// only store.
  #[serde(default)]
  pub remote_url:        Option<String>,
  /// Bound on each remote call before falling back to the local store.
  #[serde(default = "default_remote_timeout_ms")]
  pub remote_timeout_ms: u64,
}

fn default_remote_timeout_ms() -> u64 { DEFAULT_REMOTE_TIMEOUT.as_millis() as u64 }

impl ServerConfig {
  /// Read `path` (optional) and the environment on top of built-in defaults.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 5000)?
      .set_default("store_path", "~/.local/share/weave/stories.db")?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("WEAVE"))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }

  pub fn fallback_policy(&self) -> FallbackPolicy {
    FallbackPolicy { remote_timeout: Duration::from_millis(self.remote_timeout_ms) }
  }

  /// Remote client settings, or `None` when running local-only.
  pub fn remote(&self) -> Option<RemoteConfig> {
    self
      .remote_url
      .as_deref()
      .map(str::trim)
      .filter(|url| !url.is_empty())
      .map(|url| RemoteConfig {
        base_url: url.to_owned(),
        timeout:  Duration::from_millis(self.remote_timeout_ms),
      })
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The full application: story API and record protocol over one store.
pub fn router<S>(store: Arc<S>) -> Router
where
  S: StoryStore + 'static,
{
  let service = Arc::new(StoryService::new(store.clone()));
  Router::new()
    .merge(weave_api::api_router(service))
    .merge(weave_api::records_router(store))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────
