//! [`RemoteStore`] — async HTTP client for the record protocol.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode, header};
use tracing::debug;
use weave_core::{
  Story, StoryId, StorySummary,
  fallback::DEFAULT_REMOTE_TIMEOUT,
  record::{UpdateRecord, etag},
  store::StoryStore,
};

use crate::{Error, Result};

/// Connection settings for a remote record server.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
  /// Base URL the record routes are mounted under, e.g.
  /// `https://weave.example.com`.
  pub base_url: String,
  /// Per-request bound enforced by the HTTP client itself.
  pub timeout:  Duration,
}

impl RemoteConfig {
  pub fn new(base_url: impl Into<String>) -> Self {
    Self { base_url: base_url.into(), timeout: DEFAULT_REMOTE_TIMEOUT }
  }
}

/// A [`StoryStore`] that lives behind HTTP.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct RemoteStore {
  client:   Client,
  base_url: String,
}

impl RemoteStore {
  pub fn new(config: RemoteConfig) -> Result<Self> {
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, base_url: config.base_url })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url.trim_end_matches('/'), path)
  }
}

fn unexpected(method: &'static str, path: String, resp: &Response) -> Error {
  Error::Status { method, path, status: resp.status() }
}

impl StoryStore for RemoteStore {
  type Error = Error;

  /// `POST /records`
  async fn create(&self, story: Story) -> Result<StoryId> {
    let id = story.id();
    let resp = self.client.post(self.url("/records")).json(&story).send().await?;

    match resp.status() {
      StatusCode::CREATED | StatusCode::OK => {
        debug!(%id, "remote record created");
        Ok(id)
      }
      StatusCode::CONFLICT => Err(Error::AlreadyExists(id)),
      _ => Err(unexpected("POST", "/records".into(), &resp)),
    }
  }

  /// `GET /records/{id}`
  async fn get(&self, id: StoryId) -> Result<Option<Story>> {
    let path = format!("/records/{id}");
    let resp = self.client.get(self.url(&path)).send().await?;

    match resp.status() {
      StatusCode::OK => Ok(Some(resp.json().await?)),
      StatusCode::NOT_FOUND => Ok(None),
      _ => Err(unexpected("GET", path, &resp)),
    }
  }

  /// `PUT /records/{id}` with `If-Match: "<expected_count>"`
  async fn update(
    &self,
    id: StoryId,
    expected_count: usize,
    sentences: Vec<String>,
  ) -> Result<()> {
    let path = format!("/records/{id}");
    let resp = self
      .client
      .put(self.url(&path))
      .header(header::IF_MATCH, etag(expected_count))
      .json(&UpdateRecord { sentences })
      .send()
      .await?;

    match resp.status() {
      StatusCode::NO_CONTENT | StatusCode::OK => Ok(()),
      StatusCode::NOT_FOUND => Err(Error::NotFound(id)),
      StatusCode::PRECONDITION_FAILED => {
        Err(Error::Conflict { id, expected: expected_count })
      }
      _ => Err(unexpected("PUT", path, &resp)),
    }
  }

  /// `GET /records`
  async fn list(&self) -> Result<Vec<StorySummary>> {
    let resp = self.client.get(self.url("/records")).send().await?;

    if resp.status() != StatusCode::OK {
      return Err(unexpected("GET", "/records".into(), &resp));
    }
    Ok(resp.json().await?)
  }
}
