//! [`SqliteStore`] — the SQLite implementation of [`StoryStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use tracing::debug;
use weave_core::{Story, StoryId, StorySummary, store::StoryStore};

use crate::{
  Error, Result,
  encode::{
    RawStory, RawSummary, encode_count, encode_dt, encode_id, encode_sentences,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A story store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// What a conditional UPDATE that touched no rows actually ran into.
enum UpdateOutcome {
  Applied,
  Missing,
  Stale,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── StoryStore impl ─────────────────────────────────────────────────────────

impl StoryStore for SqliteStore {
  type Error = Error;

  async fn create(&self, story: Story) -> Result<StoryId> {
    let id            = story.id();
    let id_str        = encode_id(id);
    let at_str        = encode_dt(story.created_at());
    let sentences_str = encode_sentences(story.sentences())?;
    let count         = encode_count(story.count());

    // OR IGNORE leaves an existing row untouched; zero changes means the id
    // was already taken.
    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT OR IGNORE INTO stories (story_id, created_at, sentences, sentence_count)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, at_str, sentences_str, count],
        )?)
      })
      .await?;

    if inserted == 0 {
      return Err(Error::AlreadyExists(id));
    }
    Ok(id)
  }

  async fn get(&self, id: StoryId) -> Result<Option<Story>> {
    let id_str = encode_id(id);

    let raw: Option<RawStory> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT story_id, created_at, sentences FROM stories WHERE story_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawStory {
                  story_id:   row.get(0)?,
                  created_at: row.get(1)?,
                  sentences:  row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawStory::into_story).transpose()
  }

  async fn update(
    &self,
    id: StoryId,
    expected_count: usize,
    sentences: Vec<String>,
  ) -> Result<()> {
    let id_str        = encode_id(id);
    let sentences_str = encode_sentences(&sentences)?;
    let new_count     = encode_count(sentences.len());
    let expected      = encode_count(expected_count);
    // The stored column must equal the encoding of the kept prefix, so an
    // update can only ever append.
    let prefix_str = match sentences.get(..expected_count) {
      Some(prefix) => Some(encode_sentences(prefix)?),
      None => None,
    };

    let outcome = self
      .conn
      .call(move |conn| {
        let changed = match prefix_str {
          Some(prefix_str) => conn.execute(
            "UPDATE stories SET sentences = ?1, sentence_count = ?2
             WHERE story_id = ?3 AND sentence_count = ?4 AND sentences = ?5",
            rusqlite::params![sentences_str, new_count, id_str, expected, prefix_str],
          )?,
          None => 0,
        };
        if changed == 1 {
          return Ok(UpdateOutcome::Applied);
        }

        let exists = conn
          .query_row(
            "SELECT 1 FROM stories WHERE story_id = ?1",
            rusqlite::params![id_str],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        Ok(if exists { UpdateOutcome::Stale } else { UpdateOutcome::Missing })
      })
      .await?;

    match outcome {
      UpdateOutcome::Applied => {
        debug!(%id, count = sentences.len(), "story updated");
        Ok(())
      }
      UpdateOutcome::Missing => Err(Error::NotFound(id)),
      UpdateOutcome::Stale => Err(Error::Conflict { id, expected: expected_count }),
    }
  }

  async fn list(&self) -> Result<Vec<StorySummary>> {
    let raws: Vec<RawSummary> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT story_id, created_at, sentence_count
           FROM stories
           ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawSummary {
              story_id:       row.get(0)?,
              created_at:     row.get(1)?,
              sentence_count: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSummary::into_summary).collect()
  }
}
