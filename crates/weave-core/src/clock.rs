//! Clock abstraction so creation timestamps can be pinned in tests.

use chrono::{DateTime, Utc};

/// Source of the current time for newly created stories.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by [`Utc::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> { Utc::now() }
}
