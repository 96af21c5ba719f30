//! Handlers for `/records` — the persistence contract over HTTP.
//!
//! Lets one deployment act as the remote store of another (see
//! `weave-store-remote`). Conditional updates use `If-Match` carrying the
//! expected sentence count.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/records` | Body: story record; 409 if the id exists |
//! | `GET`  | `/records` | Summaries, newest first |
//! | `GET`  | `/records/{id}` | Full record + `ETag` |
//! | `PUT`  | `/records/{id}` | `If-Match` required; 412 on a stale count or rewritten history |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use weave_core::{
  Story, StorySummary, StoreError,
  record::{CreatedRecord, UpdateRecord, etag, parse_etag},
  store::StoryStore,
};

use crate::{error::ApiError, stories::parse_id};

fn store_error(err: impl Into<StoreError>) -> ApiError { ApiError::from(err.into()) }

fn require_sentences(sentences: &[String]) -> Result<(), ApiError> {
  if sentences.iter().any(|s| s.trim().is_empty()) {
    return Err(ApiError::BadRequest("sentences must not be empty".into()));
  }
  Ok(())
}

/// `POST /records`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<Story>, JsonRejection>,
) -> Result<Response, ApiError>
where
  S: StoryStore + 'static,
{
  let Json(story) = body?;
  require_sentences(story.sentences())?;
  let count = story.count();
  let id = store.create(story).await.map_err(store_error)?;
  Ok(
    (StatusCode::CREATED, [(header::ETAG, etag(count))], Json(CreatedRecord { id }))
      .into_response(),
  )
}

/// `GET /records`
pub async fn list<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<StorySummary>>, ApiError>
where
  S: StoryStore + 'static,
{
  Ok(Json(store.list().await.map_err(store_error)?))
}

/// `GET /records/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Response, ApiError>
where
  S: StoryStore + 'static,
{
  let id = parse_id(&id)?;
  let story = store
    .get(id)
    .await
    .map_err(store_error)?
    .ok_or_else(|| ApiError::NotFound(format!("story not found: {id}")))?;
  Ok(([(header::ETAG, etag(story.count()))], Json(story)).into_response())
}

/// `PUT /records/{id}` — append by resending the full sequence. The store
/// applies it only while `If-Match` holds and the stored sentences are an
/// unchanged prefix; anything else is 412.
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  headers: HeaderMap,
  body: Result<Json<UpdateRecord>, JsonRejection>,
) -> Result<Response, ApiError>
where
  S: StoryStore + 'static,
{
  let id = parse_id(&id)?;

  let if_match = headers
    .get(header::IF_MATCH)
    .ok_or_else(|| ApiError::PreconditionRequired("If-Match header required".into()))?;
  let expected = if_match
    .to_str()
    .ok()
    .and_then(parse_etag)
    .ok_or_else(|| ApiError::BadRequest("If-Match must carry a sentence count".into()))?;

  let Json(UpdateRecord { sentences }) = body?;
  if sentences.len() <= expected {
    return Err(ApiError::BadRequest(
      "an update must append at least one sentence".into(),
    ));
  }
  require_sentences(&sentences)?;

  let count = sentences.len();
  store.update(id, expected, sentences).await.map_err(store_error)?;
  Ok((StatusCode::NO_CONTENT, [(header::ETAG, etag(count))]).into_response())
}
