//! Error type for `weave-store-remote`.

use reqwest::StatusCode;
use thiserror::Error;
use weave_core::{StoreError, StoryId};

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{method} {path} → {status}")]
  Status {
    method: &'static str,
    path:   String,
    status: StatusCode,
  },

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
      Error::Http(e) if e.is_decode() => StoreError::Corrupt(e.to_string()),
      other => StoreError::unavailable(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
