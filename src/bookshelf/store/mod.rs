//! # Book Record Store
//!
//! The in-memory copy of the user's shelf for the current session. It is the
//! single source of truth for what the UI shows; the backend is the durable
//! source of truth across sessions.
//!
//! ## Ordering
//!
//! Records keep the order they were loaded in. The backend returns books most
//! recently added first and that order is kept verbatim: nothing here sorts.
//! Column views ([`BookStore::with_status`]) are filtered, never re-sorted.
//!
//! ## Mutation
//!
//! The store is refreshed wholesale with [`BookStore::load`] at session start.
//! After that the only mutation path is a status change on a single record,
//! applied by the transition applier once the backend has accepted it.

use crate::error::{Result, ShelfError};
use crate::model::{BookRecord, BookStatus, ShelfCounts, StatusChange};
use chrono::Utc;

#[derive(Debug, Clone, Default)]
pub struct BookStore {
    records: Vec<BookRecord>,
}

impl BookStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<BookRecord>) -> Self {
        Self { records }
    }

    /// Replace the whole collection.
    pub fn load(&mut self, records: Vec<BookRecord>) {
        self.records = records;
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn get(&self, id: &str) -> Result<&BookRecord> {
        self.records
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| ShelfError::BookNotFound(id.to_string()))
    }

    /// Move a record to `status`, stamping or clearing `completed_at`.
    pub fn set_status(&mut self, id: &str, status: BookStatus) -> Result<()> {
        self.apply_change(id, &StatusChange::to(status, Utc::now()))
    }

    /// Apply an exact change to one record. Every other record is untouched.
    pub fn apply_change(&mut self, id: &str, change: &StatusChange) -> Result<()> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| ShelfError::BookNotFound(id.to_string()))?;
        record.status = change.status;
        record.completed_at = change.completed_at;
        Ok(())
    }

    /// All records in load order. Call again to restart.
    pub fn all(&self) -> std::slice::Iter<'_, BookRecord> {
        self.records.iter()
    }

    pub fn with_status(&self, status: BookStatus) -> impl Iterator<Item = &BookRecord> + Clone {
        self.records.iter().filter(move |r| r.status == status)
    }

    pub fn counts(&self) -> ShelfCounts {
        self.records
            .iter()
            .fold(ShelfCounts::default(), |mut counts, r| {
                match r.status {
                    BookStatus::ToRead => counts.to_read += 1,
                    BookStatus::Completed => counts.completed += 1,
                }
                counts
            })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
