//! [`FallbackStore`] — remote-primary, local-fallback persistence.
//!
//! Every operation is tried exactly once against the remote store, bounded by
//! [`FallbackPolicy::remote_timeout`]. If the remote times out or reports
//! [`StoreError::Unavailable`], the same logical operation is replayed once
//! against the local store. Answers from the remote (conflicts, duplicate ids,
//! corrupt records) are returned as-is and never replayed, so a single write
//! lands in exactly one store.
//!
//! Stories written during an outage exist only locally, so a remote
//! `NotFound` on `get`/`update` is also resolved against the local store, and
//! `list` merges both sides. The reverse does not hold: while the remote is
//! unreachable, a story the local store lacks may still exist remotely, so
//! that miss is reported as [`StoreError::Unavailable`] rather than
//! `NotFound`.

use std::{collections::HashSet, future::Future, time::Duration};

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
  error::StoreError,
  store::StoryStore,
  story::{Story, StoryId, StorySummary, sort_newest_first},
};

/// Default bound on a single remote call.
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(3);

/// The single retry/fallback policy shared by every operation.
#[derive(Debug, Clone, Copy)]
pub struct FallbackPolicy {
  pub remote_timeout: Duration,
}

impl Default for FallbackPolicy {
  fn default() -> Self { Self { remote_timeout: DEFAULT_REMOTE_TIMEOUT } }
}

/// A lookup that missed locally while the remote could not be asked.
#[derive(Debug, Error)]
#[error("story {0} is not stored locally and the remote store is unreachable")]
pub struct RemoteUnreachable(pub StoryId);

/// A [`StoryStore`] that prefers `remote` and degrades to `local`.
#[derive(Debug, Clone)]
pub struct FallbackStore<R, L> {
  remote: R,
  local:  L,
  policy: FallbackPolicy,
}

impl<R, L> FallbackStore<R, L>
where
  R: StoryStore,
  L: StoryStore,
{
  pub fn new(remote: R, local: L, policy: FallbackPolicy) -> Self {
    Self { remote, local, policy }
  }

  pub fn remote(&self) -> &R { &self.remote }

  pub fn local(&self) -> &L { &self.local }

  /// Run one remote attempt. `None` means the remote could not be reached and
  /// the caller should fall back.
  async fn attempt_remote<T, E>(
    &self,
    operation: &'static str,
    fut: impl Future<Output = Result<T, E>>,
  ) -> Option<Result<T, StoreError>>
  where
    E: Into<StoreError>,
  {
    match tokio::time::timeout(self.policy.remote_timeout, fut).await {
      Err(_) => {
        warn!(
          operation,
          timeout_ms = self.policy.remote_timeout.as_millis() as u64,
          "remote store timed out; using local store"
        );
        None
      }
      Ok(Err(e)) => {
        let err: StoreError = e.into();
        match err {
          StoreError::Unavailable(source) => {
            warn!(operation, error = %source, "remote store unavailable; using local store");
            None
          }
          other => Some(Err(other)),
        }
      }
      Ok(Ok(value)) => Some(Ok(value)),
    }
  }
}

impl<R, L> StoryStore for FallbackStore<R, L>
where
  R: StoryStore,
  L: StoryStore,
{
  type Error = StoreError;

  async fn create(&self, story: Story) -> Result<StoryId, StoreError> {
    let replay = story.clone();
    match self.attempt_remote("create", self.remote.create(story)).await {
      Some(result) => result,
      None => self.local.create(replay).await.map_err(Into::into),
    }
  }

  async fn get(&self, id: StoryId) -> Result<Option<Story>, StoreError> {
    match self.attempt_remote("get", self.remote.get(id)).await {
      Some(Ok(Some(story))) => Ok(Some(story)),
      Some(Err(e)) => Err(e),
      Some(Ok(None)) => self.local.get(id).await.map_err(Into::into),
      None => match self.local.get(id).await.map_err(Into::into)? {
        Some(story) => Ok(Some(story)),
        None => Err(StoreError::unavailable(RemoteUnreachable(id))),
      },
    }
  }

  async fn update(
    &self,
    id: StoryId,
    expected_count: usize,
    sentences: Vec<String>,
  ) -> Result<(), StoreError> {
    let replay = sentences.clone();
    match self
      .attempt_remote("update", self.remote.update(id, expected_count, sentences))
      .await
    {
      Some(Ok(())) => Ok(()),
      Some(Err(StoreError::NotFound(_))) => {
        debug!(%id, "applying update to local store");
        self
          .local
          .update(id, expected_count, replay)
          .await
          .map_err(Into::into)
      }
      None => {
        let result: Result<(), StoreError> = self
          .local
          .update(id, expected_count, replay)
          .await
          .map_err(Into::into);
        match result {
          Err(StoreError::NotFound(id)) => {
            Err(StoreError::unavailable(RemoteUnreachable(id)))
          }
          other => other,
        }
      }
      Some(Err(e)) => Err(e),
    }
  }

  async fn list(&self) -> Result<Vec<StorySummary>, StoreError> {
    let remote = match self.attempt_remote("list", self.remote.list()).await {
      Some(Ok(list)) => Some(list),
      Some(Err(e)) => return Err(e),
      None => None,
    };
    let local = self.local.list().await.map_err(Into::into);

    match (remote, local) {
      (None, local) => local,
      (Some(remote), Err(e)) => {
        warn!(error = %e, "local store failed while listing; returning remote stories only");
        Ok(remote)
      }
      (Some(mut merged), Ok(local)) => {
        let seen: HashSet<StoryId> = merged.iter().map(|s| s.id).collect();
        merged.extend(local.into_iter().filter(|s| !seen.contains(&s.id)));
        sort_newest_first(&mut merged);
        Ok(merged)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use chrono::{TimeZone, Utc};

  use super::*;
  use crate::memory::MemoryStore;

  /// A remote that never answers.
  struct HangingStore;

  impl StoryStore for HangingStore {
    type Error = StoreError;

    async fn create(&self, _story: Story) -> Result<StoryId, StoreError> {
      std::future::pending().await
    }

    async fn get(&self, _id: StoryId) -> Result<Option<Story>, StoreError> {
      std::future::pending().await
    }

    async fn update(
      &self,
      _id: StoryId,
      _expected_count: usize,
      _sentences: Vec<String>,
    ) -> Result<(), StoreError> {
      std::future::pending().await
    }

    async fn list(&self) -> Result<Vec<StorySummary>, StoreError> {
      std::future::pending().await
    }
  }

  fn story_at(secs: i64, text: &str) -> Story {
    Story::new(StoryId::generate(), text.into(), Utc.timestamp_opt(secs, 0).unwrap())
  }

  type Shared = Arc<MemoryStore>;

  fn pair() -> (Shared, Shared, FallbackStore<Shared, Shared>) {
    let remote = Arc::new(MemoryStore::new());
    let local = Arc::new(MemoryStore::new());
    let store =
      FallbackStore::new(remote.clone(), local.clone(), FallbackPolicy::default());
    (remote, local, store)
  }

  #[tokio::test]
  async fn healthy_remote_receives_writes_exclusively() {
    let (remote, local, store) = pair();
    let id = store.create(story_at(1, "Once.")).await.unwrap();

    assert!(remote.get(id).await.unwrap().is_some());
    assert!(local.get(id).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn failed_remote_create_lands_locally_with_identical_content() {
    let (remote, local, store) = pair();
    remote.set_offline(true);

    let original = story_at(1, "A knock at the door.");
    let id = store.create(original.clone()).await.unwrap();

    assert_eq!(local.get(id).await.unwrap().unwrap(), original);
    assert_eq!(store.get(id).await.unwrap().unwrap(), original);

    // Still resolvable once the remote is back.
    remote.set_offline(false);
    assert_eq!(store.get(id).await.unwrap().unwrap(), original);
    assert!(remote.get(id).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn update_of_local_only_story_goes_local() {
    let (remote, local, store) = pair();
    remote.set_offline(true);
    let s = story_at(1, "Once.");
    let id = store.create(s.clone()).await.unwrap();
    remote.set_offline(false);

    store.update(id, 1, s.appended("Twice.".into())).await.unwrap();
    assert_eq!(local.get(id).await.unwrap().unwrap().count(), 2);
  }

  #[tokio::test]
  async fn remote_only_story_is_unavailable_not_missing_during_outage() {
    let (remote, local, store) = pair();
    let s = story_at(1, "Once.");
    let id = store.create(s.clone()).await.unwrap();
    remote.set_offline(true);

    let err = store.update(id, 1, s.appended("Twice.".into())).await.unwrap_err();
    assert!(err.is_unavailable(), "{err}");
    assert!(local.get(id).await.unwrap().is_none());

    let err = store.get(id).await.unwrap_err();
    assert!(err.is_unavailable(), "{err}");

    let svc = crate::StoryService::new(store);
    let err = svc.append_sentence(id, "Twice.").await.unwrap_err();
    assert!(matches!(err, crate::Error::StorageUnavailable(_)), "{err}");

    remote.set_offline(false);
    assert_eq!(svc.latest_sentence(id).await.unwrap().count, 1);
  }

  #[tokio::test]
  async fn remote_conflict_is_not_replayed_locally() {
    let (_remote, local, store) = pair();
    let s = story_at(1, "Once.");
    let id = store.create(s.clone()).await.unwrap();
    store.update(id, 1, s.appended("A.".into())).await.unwrap();

    let err = store.update(id, 1, s.appended("B.".into())).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict { .. }));
    assert!(local.get(id).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn list_merges_both_stores_newest_first() {
    let (remote, _local, store) = pair();
    let old = store.create(story_at(10, "Remote.")).await.unwrap();
    remote.set_offline(true);
    let new = store.create(story_at(20, "Local.")).await.unwrap();

    let offline: Vec<_> = store.list().await.unwrap().iter().map(|s| s.id).collect();
    assert_eq!(offline, [new]);

    remote.set_offline(false);
    let merged: Vec<_> = store.list().await.unwrap().iter().map(|s| s.id).collect();
    assert_eq!(merged, [new, old]);
  }

  #[tokio::test(start_paused = true)]
  async fn hanging_remote_times_out_into_local() {
    let local = Arc::new(MemoryStore::new());
    let store = FallbackStore::new(
      HangingStore,
      local.clone(),
      FallbackPolicy { remote_timeout: Duration::from_millis(50) },
    );

    let id = store.create(story_at(1, "Once.")).await.unwrap();
    assert!(local.get(id).await.unwrap().is_some());
    assert_eq!(store.list().await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn local_failure_surfaces_as_unavailable() {
    let (remote, local, store) = pair();
    remote.set_offline(true);
    local.set_offline(true);

    let err = store.create(story_at(1, "Once.")).await.unwrap_err();
    assert!(err.is_unavailable());
  }
}
