//! Story types — the append-only sentence log and its read projections.
//!
//! A [`Story`] can only be constructed with at least one sentence, so the
//! latest sentence is always available without a fallible lookup. The
//! persisted shape is `{id, sentences, createdAt}`; nothing derived (latest
//! sentence, count) is ever stored.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ─── Identity ────────────────────────────────────────────────────────────────

/// Opaque, never-reused story identifier.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct StoryId(Uuid);

impl StoryId {
  /// Allocate a fresh random id.
  pub fn generate() -> Self { Self(Uuid::new_v4()) }

  pub fn as_uuid(&self) -> Uuid { self.0 }
}

impl From<Uuid> for StoryId {
  fn from(id: Uuid) -> Self { Self(id) }
}

impl fmt::Display for StoryId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.hyphenated().fmt(f)
  }
}

impl FromStr for StoryId {
  type Err = uuid::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> { Ok(Self(Uuid::parse_str(s)?)) }
}

// ─── Story ───────────────────────────────────────────────────────────────────

/// Returned when a record would produce a story with no sentences.
#[derive(Debug, Clone, Error)]
#[error("story {0} has no sentences")]
pub struct EmptyStory(pub StoryId);

/// An ordered, append-only sequence of sentences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoryRecord", into = "StoryRecord")]
pub struct Story {
  id:         StoryId,
  sentences:  Vec<String>,
  created_at: DateTime<Utc>,
}

/// Wire and storage shape of a [`Story`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoryRecord {
  id:         StoryId,
  sentences:  Vec<String>,
  created_at: DateTime<Utc>,
}

impl TryFrom<StoryRecord> for Story {
  type Error = EmptyStory;

  fn try_from(r: StoryRecord) -> Result<Self, Self::Error> {
    Story::from_parts(r.id, r.sentences, r.created_at)
  }
}

impl From<Story> for StoryRecord {
  fn from(s: Story) -> Self {
    StoryRecord { id: s.id, sentences: s.sentences, created_at: s.created_at }
  }
}

impl Story {
  /// A brand-new story holding only its opening sentence.
  pub fn new(id: StoryId, opening: String, created_at: DateTime<Utc>) -> Self {
    Self { id, sentences: vec![opening], created_at }
  }

  /// Rebuild a story read back from storage.
  pub fn from_parts(
    id: StoryId,
    sentences: Vec<String>,
    created_at: DateTime<Utc>,
  ) -> Result<Self, EmptyStory> {
    if sentences.is_empty() {
      return Err(EmptyStory(id));
    }
    Ok(Self { id, sentences, created_at })
  }

  pub fn id(&self) -> StoryId { self.id }

  pub fn sentences(&self) -> &[String] { &self.sentences }

  pub fn created_at(&self) -> DateTime<Utc> { self.created_at }

  pub fn count(&self) -> usize { self.sentences.len() }

  /// The most recent sentence; index 0 when only the opening exists.
  pub fn latest(&self) -> &str {
    // Non-empty by construction.
    &self.sentences[self.sentences.len() - 1]
  }

  /// The full sequence with `sentence` appended, ready for a conditional
  /// update keyed on [`Story::count`].
  pub fn appended(&self, sentence: String) -> Vec<String> {
    let mut next = Vec::with_capacity(self.sentences.len() + 1);
    next.extend_from_slice(&self.sentences);
    next.push(sentence);
    next
  }

  pub fn summary(&self) -> StorySummary {
    StorySummary {
      id:             self.id,
      sentence_count: self.count(),
      created_at:     self.created_at,
    }
  }

  pub fn into_full(self) -> FullStory {
    FullStory { id: self.id, count: self.sentences.len(), sentences: self.sentences }
  }
}

// ─── Projections ─────────────────────────────────────────────────────────────

/// What a contributor sees before adding a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestSentence {
  pub sentence: String,
  pub count:    usize,
}

/// The whole story, for readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullStory {
  pub id:        StoryId,
  pub sentences: Vec<String>,
  pub count:     usize,
}

/// Listing entry; never carries sentence text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorySummary {
  pub id:             StoryId,
  pub sentence_count: usize,
  pub created_at:     DateTime<Utc>,
}

/// Sort summaries newest first. Stable, so equal timestamps keep their
/// relative order.
pub fn sort_newest_first(summaries: &mut [StorySummary]) {
  summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
