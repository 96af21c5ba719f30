//! Handlers for `/stories` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/stories` | Body: `{"openingSentence":"..."}`; returns 201 + `{storyId}` |
//! | `GET`  | `/stories` | Summaries only, newest first |
//! | `GET`  | `/stories/{id}` | Full story |
//! | `GET`  | `/stories/{id}/latest` | Latest sentence and count |
//! | `POST` | `/stories/{id}/sentences` | Body: `{"sentence":"..."}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use weave_core::{
  FullStory, LatestSentence, StoryId, StoryService, StorySummary, store::StoryStore,
};

use crate::error::ApiError;

type Service<S> = State<Arc<StoryService<S>>>;

/// Parse a path segment into a [`StoryId`], rejecting garbage with a 400.
pub(crate) fn parse_id(raw: &str) -> Result<StoryId, ApiError> {
  raw
    .parse()
    .map_err(|_| ApiError::BadRequest(format!("invalid story id: {raw:?}")))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
  pub message: String,
}

// ─── Start ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartBody {
  pub opening_sentence: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Started {
  pub story_id: StoryId,
  pub message:  String,
}

/// `POST /stories` — returns 201 + `{storyId, message}`.
pub async fn create<S>(
  State(service): Service<S>,
  body: Result<Json<StartBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: StoryStore + 'static,
{
  let Json(body) = body?;
  let story_id = service.start_story(body.opening_sentence).await?;
  Ok((
    StatusCode::CREATED,
    Json(Started { story_id, message: "Story created successfully".into() }),
  ))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /stories`
pub async fn list<S>(State(service): Service<S>) -> Result<Json<Vec<StorySummary>>, ApiError>
where
  S: StoryStore + 'static,
{
  Ok(Json(service.list_stories().await?))
}

// ─── Reads ────────────────────────────────────────────────────────────────────

/// `GET /stories/{id}`
pub async fn get_one<S>(
  State(service): Service<S>,
  Path(id): Path<String>,
) -> Result<Json<FullStory>, ApiError>
where
  S: StoryStore + 'static,
{
  let id = parse_id(&id)?;
  Ok(Json(service.full_story(id).await?))
}

/// `GET /stories/{id}/latest`
pub async fn latest<S>(
  State(service): Service<S>,
  Path(id): Path<String>,
) -> Result<Json<LatestSentence>, ApiError>
where
  S: StoryStore + 'static,
{
  let id = parse_id(&id)?;
  Ok(Json(service.latest_sentence(id).await?))
}

// ─── Append ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AppendBody {
  pub sentence: String,
}

/// `POST /stories/{id}/sentences` — 409 when another contributor got there
/// first; the client should reload the latest sentence.
pub async fn append<S>(
  State(service): Service<S>,
  Path(id): Path<String>,
  body: Result<Json<AppendBody>, JsonRejection>,
) -> Result<Json<Message>, ApiError>
where
  S: StoryStore + 'static,
{
  let id = parse_id(&id)?;
  let Json(body) = body?;
  service.append_sentence(id, body.sentence).await?;
  Ok(Json(Message { message: "Sentence added successfully".into() }))
}
