//! Core types and trait definitions for Story Weave.
//!
//! A story is an append-only sequence of sentences. This crate owns the
//! domain model, the [`store::StoryStore`] persistence contract, the
//! remote-then-local [`fallback::FallbackStore`] and the
//! [`service::StoryService`] that enforces the append rules. It is free of
//! HTTP and database code; backends live in their own crates.

pub mod clock;
pub mod error;
pub mod fallback;
pub mod memory;
pub mod record;
pub mod service;
pub mod store;
pub mod story;

pub use error::{Error, Result, StoreError};
pub use service::StoryService;
pub use story::{FullStory, LatestSentence, Story, StoryId, StorySummary};
