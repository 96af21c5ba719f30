//! [`StoryService`] — the append-only story log.
//!
//! The service validates input, allocates ids and timestamps, and turns
//! every append into a conditional update keyed on the sentence count it
//! read. It does not serialise concurrent appends itself and never retries a
//! [`Error::Conflict`]; callers re-read the latest sentence and decide.

use std::sync::Arc;

use tracing::debug;

use crate::{
  Error, Result,
  clock::{Clock, SystemClock},
  error::StoreError,
  store::StoryStore,
  story::{FullStory, LatestSentence, Story, StoryId, StorySummary},
};

pub struct StoryService<S> {
  store: S,
  clock: Arc<dyn Clock>,
}

impl<S: StoryStore> StoryService<S> {
  pub fn new(store: S) -> Self { Self::with_clock(store, Arc::new(SystemClock)) }

  pub fn with_clock(store: S, clock: Arc<dyn Clock>) -> Self { Self { store, clock } }

  pub fn store(&self) -> &S { &self.store }

  /// Start a story with its opening sentence and return the new id.
  pub async fn start_story(&self, opening: impl Into<String>) -> Result<StoryId> {
    let opening = require_sentence(opening.into(), "opening sentence")?;

    let story = Story::new(StoryId::generate(), opening, self.clock.now());
    let id = self.store.create(story).await.map_err(store_error)?;

    debug!(%id, "story started");
    Ok(id)
  }

  /// Append one sentence to an existing story.
  pub async fn append_sentence(
    &self,
    id: StoryId,
    sentence: impl Into<String>,
  ) -> Result<()> {
    let sentence = require_sentence(sentence.into(), "sentence")?;

    let story = self.load(id).await?;
    self
      .store
      .update(id, story.count(), story.appended(sentence))
      .await
      .map_err(store_error)?;

    debug!(%id, count = story.count() + 1, "sentence appended");
    Ok(())
  }

  /// The last sentence and the total count, without the rest of the text.
  pub async fn latest_sentence(&self, id: StoryId) -> Result<LatestSentence> {
    let story = self.load(id).await?;
    Ok(LatestSentence { sentence: story.latest().to_owned(), count: story.count() })
  }

  pub async fn full_story(&self, id: StoryId) -> Result<FullStory> {
    Ok(self.load(id).await?.into_full())
  }

  /// Summaries of every known story, newest first.
  pub async fn list_stories(&self) -> Result<Vec<StorySummary>> {
    self.store.list().await.map_err(store_error)
  }

  async fn load(&self, id: StoryId) -> Result<Story> {
    self
      .store
      .get(id)
      .await
      .map_err(store_error)?
      .ok_or(Error::NotFound(id))
  }
}

fn store_error(err: impl Into<StoreError>) -> Error { Error::from(err.into()) }

fn require_sentence(text: String, what: &str) -> Result<String> {
  if text.trim().is_empty() {
    return Err(Error::Validation(format!("{what} must not be empty")));
  }
  Ok(text)
}
