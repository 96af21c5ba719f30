//! Networked [`weave_core::store::StoryStore`] backend.
//!
//! Speaks the record protocol served by `weave_api::records_router`. Every
//! transport failure, timeout or 5xx is reported as
//! [`weave_core::StoreError::Unavailable`] so a
//! [`weave_core::fallback::FallbackStore`] can take over.

mod client;

pub mod error;

pub use client::{RemoteConfig, RemoteStore};
pub use error::{Error, Result};
