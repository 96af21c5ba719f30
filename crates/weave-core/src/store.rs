//! The `StoryStore` trait — the persistence contract.
//!
//! Implemented by storage backends (`weave-store-sqlite`,
//! `weave-store-remote`), by the in-process [`crate::memory::MemoryStore`]
//! and by the [`crate::fallback::FallbackStore`] that composes two of them.
//! [`crate::StoryService`] depends on this abstraction only and never learns
//! which medium served a call.

use std::{future::Future, sync::Arc};

use crate::{
  error::StoreError,
  story::{Story, StoryId, StorySummary},
};

/// Abstraction over a durable story store.
///
/// Stores never overwrite an existing id and never apply an update whose
/// expected sentence count is stale or which rewrites earlier sentences; that
/// check must be atomic per story.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait StoryStore: Send + Sync {
  type Error: std::error::Error + Into<StoreError> + Send + Sync + 'static;

  /// Persist a new story under its own id. Fails with
  /// [`StoreError::AlreadyExists`] if the id is taken.
  fn create(
    &self,
    story: Story,
  ) -> impl Future<Output = Result<StoryId, Self::Error>> + Send + '_;

  /// Retrieve a story by id. Returns `None` if not found.
  fn get(
    &self,
    id: StoryId,
  ) -> impl Future<Output = Result<Option<Story>, Self::Error>> + Send + '_;

  /// Replace the sentence sequence of `id`, but only if it currently holds
  /// exactly `expected_count` sentences and those sentences are an unchanged
  /// prefix of `sentences`.
  ///
  /// Fails with [`StoreError::NotFound`] for an unknown id and with
  /// [`StoreError::Conflict`] when another writer got there first or the
  /// stored prefix differs.
  fn update(
    &self,
    id: StoryId,
    expected_count: usize,
    sentences: Vec<String>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Summaries of every story, newest first.
  fn list(
    &self,
  ) -> impl Future<Output = Result<Vec<StorySummary>, Self::Error>> + Send + '_;
}

impl<S: StoryStore> StoryStore for Arc<S> {
  type Error = S::Error;

  fn create(
    &self,
    story: Story,
  ) -> impl Future<Output = Result<StoryId, Self::Error>> + Send + '_ {
    (**self).create(story)
  }

  fn get(
    &self,
    id: StoryId,
  ) -> impl Future<Output = Result<Option<Story>, Self::Error>> + Send + '_ {
    (**self).get(id)
  }

  fn update(
    &self,
    id: StoryId,
    expected_count: usize,
    sentences: Vec<String>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_ {
    (**self).update(id, expected_count, sentences)
  }

  fn list(
    &self,
  ) -> impl Future<Output = Result<Vec<StorySummary>, Self::Error>> + Send + '_ {
    (**self).list()
  }
}
