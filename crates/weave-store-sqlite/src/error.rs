//! Error type for `weave-store-sqlite`.

use thiserror::Error;
use weave_core::{StoreError, StoryId, story::EmptyStory};

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("invalid sentence count: {0}")]
  InvalidCount(i64),

  #[error(transparent)]
  EmptyStory(#[from] EmptyStory),

  #[error("story not found: {0}")]
  NotFound(StoryId),

  #[error("story {id} was modified concurrently (expected {expected} sentences)")]
  Conflict { id: StoryId, expected: usize },

  #[error("story already exists: {0}")]
  AlreadyExists(StoryId),
}

impl From<Error> for StoreError {
  fn from(err: Error) -> Self {
    match err {
      Error::NotFound(id) => StoreError::NotFound(id),
      Error::Conflict { id, expected } => StoreError::Conflict { id, expected },
      Error::AlreadyExists(id) => StoreError::AlreadyExists(id),
      Error::Database(e) => StoreError::unavailable(e),
      corrupt @ (Error::Json(_)
      | Error::Uuid(_)
      | Error::DateParse(_)
      | Error::InvalidCount(_)
      | Error::EmptyStory(_)) => StoreError::Corrupt(corrupt.to_string()),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
