//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings so that text order
//! equals chronological order. Sentences are stored as a compact JSON array.

use chrono::{DateTime, SecondsFormat, Utc};
use weave_core::{Story, StoryId, StorySummary};

use crate::{Error, Result};

// ─── StoryId ─────────────────────────────────────────────────────────────────

pub fn encode_id(id: StoryId) -> String { id.to_string() }

pub fn decode_id(s: &str) -> Result<StoryId> { Ok(s.parse()?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Sentences ───────────────────────────────────────────────────────────────

pub fn encode_sentences(sentences: &[String]) -> Result<String> {
  Ok(serde_json::to_string(sentences)?)
}

pub fn decode_sentences(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

pub fn encode_count(count: usize) -> i64 {
  i64::try_from(count).unwrap_or(i64::MAX)
}

pub fn decode_count(n: i64) -> Result<usize> {
  usize::try_from(n).map_err(|_| Error::InvalidCount(n))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `stories` row.
pub struct RawStory {
  pub story_id:   String,
  pub created_at: String,
  pub sentences:  String,
}

impl RawStory {
  pub fn into_story(self) -> Result<Story> {
    Ok(Story::from_parts(
      decode_id(&self.story_id)?,
      decode_sentences(&self.sentences)?,
      decode_dt(&self.created_at)?,
    )?)
  }
}

/// Summary columns only; sentence text is never read for listings.
pub struct RawSummary {
  pub story_id:       String,
  pub created_at:     String,
  pub sentence_count: i64,
}

impl RawSummary {
  pub fn into_summary(self) -> Result<StorySummary> {
    Ok(StorySummary {
      id:             decode_id(&self.story_id)?,
      sentence_count: decode_count(self.sentence_count)?,
      created_at:     decode_dt(&self.created_at)?,
    })
  }
}
