//! Wire types for the record protocol — the [`crate::store::StoryStore`]
//! contract spoken over HTTP.
//!
//! The server side lives in `weave-api`, the client in `weave-store-remote`.
//! Conditional updates carry the expected sentence count as an entity tag:
//! `If-Match: "3"` succeeds only while the record holds exactly three
//! sentences.

use serde::{Deserialize, Serialize};

use crate::story::StoryId;

/// Body of `PUT /records/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRecord {
  pub sentences: Vec<String>,
}

/// Body of a successful `POST /records`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedRecord {
  pub id: StoryId,
}

/// Entity tag for a record holding `count` sentences.
pub fn etag(count: usize) -> String { format!("\"{count}\"") }

/// Parse an entity tag produced by [`etag`]. Quotes are optional and a weak
/// `W/` prefix is tolerated.
pub fn parse_etag(value: &str) -> Option<usize> {
  let value = value.trim();
  let value = value.strip_prefix("W/").unwrap_or(value);
  value.trim_matches('"').parse().ok()
}
