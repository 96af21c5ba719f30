//! JSON REST API for Story Weave.
//!
//! Two routers:
//!
//! - [`api_router`]: the contributor-facing story API, backed by a
//!   [`StoryService`].
//! - [`records_router`]: the raw persistence contract, backed by any
//!   [`StoryStore`], so this deployment can be another one's remote store.
//!
//! TLS, CORS and tracing layers are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! Router::new()
//!   .merge(weave_api::api_router(service))
//!   .merge(weave_api::records_router(store))
//! ```

pub mod error;
pub mod records;
pub mod stories;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use weave_core::{StoryService, store::StoryStore};

pub use error::ApiError;

/// Build the story API router for `service`.
///
/// The returned `Router<()>` can be merged into any parent router regardless
/// of its own state type.
pub fn api_router<S>(service: Arc<StoryService<S>>) -> Router<()>
where
  S: StoryStore + 'static,
{
  Router::new()
    .route("/stories", get(stories::list::<S>).post(stories::create::<S>))
    .route("/stories/{id}", get(stories::get_one::<S>))
    .route("/stories/{id}/latest", get(stories::latest::<S>))
    .route("/stories/{id}/sentences", post(stories::append::<S>))
    .with_state(service)
}

/// Build the record-protocol router for `store`.
pub fn records_router<S>(store: Arc<S>) -> Router<()>
where
  S: StoryStore + 'static,
{
  Router::new()
    .route("/records", get(records::list::<S>).post(records::create::<S>))
    .route("/records/{id}", get(records::get_one::<S>).put(records::update::<S>))
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use chrono::Utc;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use weave_core::{Story, StoryId, memory::MemoryStore};

  fn app() -> Router {
    api_router(Arc::new(StoryService::new(MemoryStore::new())))
  }

  async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
  }

  async fn json_body(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  async fn start(app: &Router, opening: &str) -> String {
    let body = json!({ "openingSentence": opening });
    let resp = send(app, "POST", "/stories", Some(body)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    json_body(resp).await["storyId"].as_str().unwrap().to_owned()
  }

  // ── Stories ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn knock_at_the_door_end_to_end() {
    let app = app();
    let id = start(&app, "A knock at the door.").await;

    let resp = send(
      &app,
      "POST",
      &format!("/stories/{id}/sentences"),
      Some(json!({ "sentence": "She opened it slowly." })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["message"], "Sentence added successfully");

    let resp = send(&app, "GET", &format!("/stories/{id}"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
      json_body(resp).await,
      json!({
        "id": id,
        "sentences": ["A knock at the door.", "She opened it slowly."],
        "count": 2,
      })
    );
  }

  #[tokio::test]
  async fn latest_returns_only_the_last_sentence() {
    let app = app();
    let id = start(&app, "First.").await;
    send(
      &app,
      "POST",
      &format!("/stories/{id}/sentences"),
      Some(json!({ "sentence": "Second." })),
    )
    .await;

    let resp = send(&app, "GET", &format!("/stories/{id}/latest"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!({ "sentence": "Second.", "count": 2 }));
  }

  #[tokio::test]
  async fn list_carries_summaries_only() {
    let app = app();
    let id = start(&app, "Secret text.").await;

    let resp = send(&app, "GET", "/stories", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["id"], id);
    assert_eq!(entries[0]["sentenceCount"], 1);
    assert!(entries[0].get("createdAt").is_some());
    assert!(entries[0].get("sentences").is_none());
  }

  #[tokio::test]
  async fn blank_opening_is_400_with_error_body() {
    let app = app();
    let body = json!({ "openingSentence": "  " });
    let resp = send(&app, "POST", "/stories", Some(body)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(resp).await["error"].is_string());

    let resp = send(&app, "GET", "/stories", None).await;
    assert_eq!(json_body(resp).await, json!([]));
  }

  #[tokio::test]
  async fn missing_field_is_400() {
    let app = app();
    let body = json!({ "firstSentence": "Hi." });
    let resp = send(&app, "POST", "/stories", Some(body)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(resp).await["error"].is_string());
  }

  #[tokio::test]
  async fn unknown_story_is_404_everywhere() {
    let app = app();
    let id = StoryId::generate();

    for (method, uri, body) in [
      ("GET", format!("/stories/{id}"), None),
      ("GET", format!("/stories/{id}/latest"), None),
      (
        "POST",
        format!("/stories/{id}/sentences"),
        Some(json!({ "sentence": "Hi." })),
      ),
    ] {
      let resp = send(&app, method, &uri, body).await;
      assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{method} {uri}");
      assert_eq!(json_body(resp).await, json!({ "error": "Story not found" }));
    }
  }

  #[tokio::test]
  async fn malformed_id_is_400() {
    let app = app();
    let resp = send(&app, "GET", "/stories/not-an-id", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn blank_append_is_400() {
    let app = app();
    let id = start(&app, "Start.").await;
    let resp = send(
      &app,
      "POST",
      &format!("/stories/{id}/sentences"),
      Some(json!({ "sentence": "" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn storage_outage_is_503() {
    let store = Arc::new(MemoryStore::new());
    let app = api_router(Arc::new(StoryService::new(store.clone())));
    store.set_offline(true);

    let resp = send(&app, "GET", "/stories", None).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(json_body(resp).await["error"].is_string());
  }

  // ── Records ─────────────────────────────────────────────────────────────────

  fn records() -> (Arc<MemoryStore>, Router) {
    let store = Arc::new(MemoryStore::new());
    (store.clone(), records_router(store))
  }

  async fn put_record(
    app: &Router,
    id: StoryId,
    if_match: Option<&str>,
    sentences: Value,
  ) -> Response {
    let mut builder = Request::builder()
      .method("PUT")
      .uri(format!("/records/{id}"))
      .header(header::CONTENT_TYPE, "application/json");
    if let Some(tag) = if_match {
      builder = builder.header(header::IF_MATCH, tag);
    }
    let body = Body::from(json!({ "sentences": sentences }).to_string());
    app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
  }

  #[tokio::test]
  async fn record_create_then_get_carries_etag() {
    let (_store, app) = records();
    let story = Story::new(StoryId::generate(), "Once.".into(), Utc::now());

    let record = serde_json::to_value(&story).unwrap();
    let resp = send(&app, "POST", "/records", Some(record)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = send(&app, "GET", &format!("/records/{}", story.id()), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::ETAG], "\"1\"");
    let fetched: Story = serde_json::from_value(json_body(resp).await).unwrap();
    assert_eq!(fetched, story);
  }

  #[tokio::test]
  async fn record_duplicate_create_is_409() {
    let (_store, app) = records();
    let story = Story::new(StoryId::generate(), "Once.".into(), Utc::now());
    let story = serde_json::to_value(story).unwrap();

    send(&app, "POST", "/records", Some(story.clone())).await;
    let resp = send(&app, "POST", "/records", Some(story)).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
  }

  #[tokio::test]
  async fn record_with_no_sentences_is_rejected() {
    let (store, app) = records();
    let record = json!({
      "id": StoryId::generate(),
      "sentences": [],
      "createdAt": "2024-01-01T00:00:00Z",
    });
    let resp = send(&app, "POST", "/records", Some(record)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(store.list().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn record_update_honours_if_match() {
    let (store, app) = records();
    let story = Story::new(StoryId::generate(), "Once.".into(), Utc::now());
    let id = store.create(story).await.unwrap();

    let resp = put_record(&app, id, None, json!(["Once.", "A"])).await;
    assert_eq!(resp.status(), StatusCode::PRECONDITION_REQUIRED);

    let resp = put_record(&app, id, Some("\"1\""), json!(["Once.", "A"])).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(resp.headers()[header::ETAG], "\"2\"");

    let resp = put_record(&app, id, Some("\"1\""), json!(["Once.", "B"])).await;
    assert_eq!(resp.status(), StatusCode::PRECONDITION_FAILED);

    let stored = store.get(id).await.unwrap().unwrap();
    assert_eq!(stored.sentences(), ["Once.", "A"]);
  }

  #[tokio::test]
  async fn record_with_a_blank_sentence_is_rejected() {
    let (store, app) = records();
    let record = json!({
      "id": StoryId::generate(),
      "sentences": ["   "],
      "createdAt": "2024-01-01T00:00:00Z",
    });
    let resp = send(&app, "POST", "/records", Some(record)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(store.list().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn record_update_cannot_rewrite_history() {
    let (store, app) = records();
    let story = Story::new(StoryId::generate(), "Once.".into(), Utc::now());
    let id = store.create(story).await.unwrap();

    let resp = put_record(&app, id, Some("\"1\""), json!(["Rewritten.", "B"])).await;
    assert_eq!(resp.status(), StatusCode::PRECONDITION_FAILED);

    let stored = store.get(id).await.unwrap().unwrap();
    assert_eq!(stored.sentences(), ["Once."]);
  }

  #[tokio::test]
  async fn record_update_must_grow_the_story() {
    let (store, app) = records();
    let story = Story::new(StoryId::generate(), "Once.".into(), Utc::now());
    let id = store.create(story).await.unwrap();

    let resp = put_record(&app, id, Some("1"), json!(["Rewritten."])).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn record_update_of_unknown_id_is_404() {
    let (_store, app) = records();
    let resp = put_record(&app, StoryId::generate(), Some("1"), json!(["a", "b"])).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}
