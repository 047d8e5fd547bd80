//! # Persistence Collaborator
//!
//! Books, profiles, and reading stats live in a hosted backend. This module
//! defines the [`ShelfBackend`] trait the rest of the crate talks to, so the
//! reconciler can run against the real service or against a test double.
//!
//! ## Implementations
//!
//! - [`rest::RestBackend`]: HTTP client for a PostgREST-style hosted backend
//!   (`/rest/v1/<table>`) with a GoTrue-style auth service (`/auth/v1`).
//! - [`memory::InMemoryBackend`]: in-process tables for tests, with switches
//!   to make each call fail and a log of the writes it received.
//!
//! ## Error Kinds
//!
//! Each call maps its failures onto one error kind so callers can react by
//! operation rather than by transport:
//! - `list_books`, `get_profile`, `get_stats` → [`ShelfError::Query`](crate::error::ShelfError::Query)
//! - `update_book_status` → [`ShelfError::Update`](crate::error::ShelfError::Update)
//! - `update_stats` → [`ShelfError::StatsUpdate`](crate::error::ShelfError::StatsUpdate)
//!
//! Row visibility is the backend's business (row-level security on the
//! access token), which is why `list_books` takes no user id.

use crate::error::Result;
use crate::model::{BookRecord, Profile, ReadingStats, ShelfCounts, StatusChange};
use async_trait::async_trait;
use std::sync::Arc;

pub mod memory;
pub mod rest;

#[async_trait]
pub trait ShelfBackend: Send + Sync {
    /// All visible books, most recently added first.
    async fn list_books(&self) -> Result<Vec<BookRecord>>;

    /// Persist a status change for one book.
    async fn update_book_status(&self, id: &str, change: &StatusChange) -> Result<()>;

    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>>;

    async fn get_stats(&self, user_id: &str) -> Result<Option<ReadingStats>>;

    /// Overwrite the user's to-read / completed totals.
    async fn update_stats(&self, user_id: &str, counts: ShelfCounts) -> Result<()>;
}

#[async_trait]
impl<B: ShelfBackend + ?Sized> ShelfBackend for Arc<B> {
    async fn list_books(&self) -> Result<Vec<BookRecord>> {
        (**self).list_books().await
    }

    async fn update_book_status(&self, id: &str, change: &StatusChange) -> Result<()> {
        (**self).update_book_status(id, change).await
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        (**self).get_profile(user_id).await
    }

    async fn get_stats(&self, user_id: &str) -> Result<Option<ReadingStats>> {
        (**self).get_stats(user_id).await
    }

    async fn update_stats(&self, user_id: &str, counts: ShelfCounts) -> Result<()> {
        (**self).update_stats(user_id, counts).await
    }
}
