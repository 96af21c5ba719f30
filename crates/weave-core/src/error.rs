//! Error types for `weave-core`.
//!
//! [`StoreError`] is the vocabulary every storage backend speaks; the
//! fallback adapter relies on it to tell an outage apart from an answer.
//! [`Error`] is what [`crate::StoryService`] callers see.

use thiserror::Error;

use crate::story::StoryId;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A failure reported by a [`crate::store::StoryStore`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("story not found: {0}")]
  NotFound(StoryId),

  /// A conditional update found a different sentence count than expected.
  #[error("story {id} was modified concurrently (expected {expected} sentences)")]
  Conflict { id: StoryId, expected: usize },

  #[error("story already exists: {0}")]
  AlreadyExists(StoryId),

  /// The backend returned a record that violates the story invariants.
  #[error("corrupt story record: {0}")]
  Corrupt(String),

  /// Network, I/O or database failure. The only kind the fallback absorbs.
  #[error("store unavailable: {0}")]
  Unavailable(#[source] BoxError),
}

impl StoreError {
  pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Unavailable(Box::new(err))
  }

  pub fn is_unavailable(&self) -> bool { matches!(self, Self::Unavailable(_)) }
}

/// An error returned by [`crate::StoryService`] operations.
#[derive(Debug, Error)]
pub enum Error {
  /// User-correctable input problem; storage was not touched.
  #[error("invalid input: {0}")]
  Validation(String),

  #[error("story not found: {0}")]
  NotFound(StoryId),

  /// Another append landed first. Re-read the latest sentence and retry.
  #[error("story {0} was modified concurrently; reload and try again")]
  Conflict(StoryId),

  /// Neither the remote nor the local store could serve the request.
  #[error("storage unavailable: {0}")]
  StorageUnavailable(#[source] BoxError),

  #[error("storage error: {0}")]
  Storage(#[source] StoreError),
}

impl From<StoreError> for Error {
  fn from(err: StoreError) -> Self {
    match err {
      StoreError::NotFound(id) => Self::NotFound(id),
      StoreError::Conflict { id, .. } => Self::Conflict(id),
      StoreError::Unavailable(source) => Self::StorageUnavailable(source),
      other => Self::Storage(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
