//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use weave_core::StoreError;

/// An error returned by an API handler. Rendered as `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("precondition failed: {0}")]
  PreconditionFailed(String),

  #[error("precondition required: {0}")]
  PreconditionRequired(String),

  #[error("service unavailable: {0}")]
  Unavailable(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<weave_core::Error> for ApiError {
  fn from(err: weave_core::Error) -> Self {
    use weave_core::Error;

    match err {
      Error::Validation(msg) => ApiError::BadRequest(msg),
      Error::NotFound(_) => ApiError::NotFound("Story not found".into()),
      e @ Error::Conflict(_) => ApiError::Conflict(e.to_string()),
      e @ Error::StorageUnavailable(_) => ApiError::Unavailable(e.to_string()),
      Error::Storage(e) => ApiError::Store(Box::new(e)),
    }
  }
}

impl From<StoreError> for ApiError {
  fn from(err: StoreError) -> Self {
    match err {
      e @ StoreError::NotFound(_) => ApiError::NotFound(e.to_string()),
      e @ StoreError::Conflict { .. } => ApiError::PreconditionFailed(e.to_string()),
      e @ StoreError::AlreadyExists(_) => ApiError::Conflict(e.to_string()),
      e @ StoreError::Unavailable(_) => ApiError::Unavailable(e.to_string()),
      e @ StoreError::Corrupt(_) => ApiError::Store(Box::new(e)),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::PreconditionFailed(m) => (StatusCode::PRECONDITION_FAILED, m.clone()),
      ApiError::PreconditionRequired(m) => (StatusCode::PRECONDITION_REQUIRED, m.clone()),
      ApiError::Unavailable(m) => (StatusCode::SERVICE_UNAVAILABLE, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    if status.is_server_error() {
      tracing::error!(%status, error = %message, "request failed");
    }
    (status, Json(json!({ "error": message }))).into_response()
  }
}
