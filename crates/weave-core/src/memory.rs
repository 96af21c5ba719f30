//! [`MemoryStore`] — an in-process [`StoryStore`] for tests and
//! single-process demos.
//!
//! Not a substitute for real persistence: contents vanish with the process.
//! It can be switched offline to exercise fallback paths.

use std::sync::{
  Mutex, PoisonError,
  atomic::{AtomicBool, Ordering},
};

use crate::{
  error::StoreError,
  store::StoryStore,
  story::{Story, StoryId, StorySummary, sort_newest_first},
};

#[derive(Debug, Default)]
pub struct MemoryStore {
  /// Insertion order is preserved; listing sorts on top of it.
  stories: Mutex<Vec<Story>>,
  offline: AtomicBool,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// While offline every operation fails with [`StoreError::Unavailable`].
  pub fn set_offline(&self, offline: bool) {
    self.offline.store(offline, Ordering::SeqCst);
  }

  fn check_online(&self) -> Result<(), StoreError> {
    if self.offline.load(Ordering::SeqCst) {
      return Err(StoreError::unavailable(std::io::Error::other(
        "memory store is offline",
      )));
    }
    Ok(())
  }

  fn stories(&self) -> std::sync::MutexGuard<'_, Vec<Story>> {
    self.stories.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl StoryStore for MemoryStore {
  type Error = StoreError;

  async fn create(&self, story: Story) -> Result<StoryId, StoreError> {
    self.check_online()?;
    let mut stories = self.stories();
    let id = story.id();
    if stories.iter().any(|s| s.id() == id) {
      return Err(StoreError::AlreadyExists(id));
    }
    stories.push(story);
    Ok(id)
  }

  async fn get(&self, id: StoryId) -> Result<Option<Story>, StoreError> {
    self.check_online()?;
    Ok(self.stories().iter().find(|s| s.id() == id).cloned())
  }

  async fn update(
    &self,
    id: StoryId,
    expected_count: usize,
    sentences: Vec<String>,
  ) -> Result<(), StoreError> {
    self.check_online()?;
    let mut stories = self.stories();
    let slot = stories
      .iter_mut()
      .find(|s| s.id() == id)
      .ok_or(StoreError::NotFound(id))?;

    if slot.count() != expected_count || !sentences.starts_with(slot.sentences()) {
      return Err(StoreError::Conflict { id, expected: expected_count });
    }

    *slot = Story::from_parts(id, sentences, slot.created_at())
      .map_err(|e| StoreError::Corrupt(e.to_string()))?;
    Ok(())
  }

  async fn list(&self) -> Result<Vec<StorySummary>, StoreError> {
    self.check_online()?;
    // Reverse first so equal timestamps list the later insert first.
    let mut summaries: Vec<_> =
      self.stories().iter().rev().map(Story::summary).collect();
    sort_newest_first(&mut summaries);
    Ok(summaries)
  }
}
