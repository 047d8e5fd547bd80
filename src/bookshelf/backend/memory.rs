use super::ShelfBackend;
use crate::error::{Result, ShelfError};
use crate::model::{BookRecord, Profile, ReadingStats, ShelfCounts, StatusChange};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// In-memory backend for testing and development.
/// Does NOT persist data.
#[derive(Default)]
pub struct InMemoryBackend {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    books: Vec<BookRecord>,
    profiles: HashMap<String, Profile>,
    stats: HashMap<String, ReadingStats>,
    fail_queries: bool,
    fail_updates: bool,
    fail_stats_updates: bool,
    status_updates: Vec<(String, StatusChange)>,
    stats_updates: Vec<(String, ShelfCounts)>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_books(mut self, books: Vec<BookRecord>) -> Self {
        self.state.get_mut().books = books;
        self
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.state
            .get_mut()
            .profiles
            .insert(profile.id.clone(), profile);
        self
    }

    pub fn with_stats(mut self, stats: ReadingStats) -> Self {
        self.state
            .get_mut()
            .stats
            .insert(stats.user_id.clone(), stats);
        self
    }

    /// Make `list_books`, `get_profile` and `get_stats` fail.
    pub fn failing_queries(mut self) -> Self {
        self.state.get_mut().fail_queries = true;
        self
    }

    /// Make `update_book_status` fail.
    pub fn failing_updates(mut self) -> Self {
        self.state.get_mut().fail_updates = true;
        self
    }

    /// Make `update_stats` fail.
    pub fn failing_stats_updates(mut self) -> Self {
        self.state.get_mut().fail_stats_updates = true;
        self
    }

    pub async fn set_fail_updates(&self, fail: bool) {
        self.state.lock().await.fail_updates = fail;
    }

    /// Every status write received, in arrival order, including rejected ones.
    pub async fn status_updates(&self) -> Vec<(String, StatusChange)> {
        self.state.lock().await.status_updates.clone()
    }

    /// Every stats write received, in arrival order, including rejected ones.
    pub async fn stats_updates(&self) -> Vec<(String, ShelfCounts)> {
        self.state.lock().await.stats_updates.clone()
    }

    pub async fn book(&self, id: &str) -> Option<BookRecord> {
        let state = self.state.lock().await;
        state.books.iter().find(|b| b.id == id).cloned()
    }
}

#[async_trait]
impl ShelfBackend for InMemoryBackend {
    async fn list_books(&self) -> Result<Vec<BookRecord>> {
        let state = self.state.lock().await;
        if state.fail_queries {
            return Err(ShelfError::Query("backend unreachable".into()));
        }
        let mut books = state.books.clone();
        // Stable sort: rows without a timestamp keep their relative order at the end.
        books.sort_by(|a, b| b.added_at.cmp(&a.added_at));
        Ok(books)
    }

    async fn update_book_status(&self, id: &str, change: &StatusChange) -> Result<()> {
        let mut state = self.state.lock().await;
        state.status_updates.push((id.to_string(), *change));
        if state.fail_updates {
            return Err(ShelfError::Update("backend unreachable".into()));
        }
        let book = state
            .books
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| ShelfError::Update(format!("no book with id {}", id)))?;
        book.status = change.status;
        book.completed_at = change.completed_at;
        Ok(())
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        let state = self.state.lock().await;
        if state.fail_queries {
            return Err(ShelfError::Query("backend unreachable".into()));
        }
        Ok(state.profiles.get(user_id).cloned())
    }

    async fn get_stats(&self, user_id: &str) -> Result<Option<ReadingStats>> {
        let state = self.state.lock().await;
        if state.fail_queries {
            return Err(ShelfError::Query("backend unreachable".into()));
        }
        Ok(state.stats.get(user_id).cloned())
    }

    async fn update_stats(&self, user_id: &str, counts: ShelfCounts) -> Result<()> {
        let mut state = self.state.lock().await;
        state.stats_updates.push((user_id.to_string(), counts));
        if state.fail_stats_updates {
            return Err(ShelfError::StatsUpdate("backend unreachable".into()));
        }
        let row = state
            .stats
            .entry(user_id.to_string())
            .or_insert_with(|| ReadingStats::new(user_id));
        row.total_books_to_read = counts.to_read as u32;
        row.total_books_read = counts.completed as u32;
        Ok(())
    }
}

// --- Test Fixtures ---


#[cfg(test)]
mod tests {
    use super::fixtures::books;
    use super::*;
    use crate::model::BookStatus;
    use chrono::Utc;

    #[tokio::test]
    async fn lists_newest_first() {
        let backend = InMemoryBackend::new().with_books(books(&[
            ("1", "Old", BookStatus::ToRead),
            ("2", "New", BookStatus::ToRead),
        ]));
        let ids: Vec<_> = backend
            .list_books()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec!["2", "1"]);
    }

    #[tokio::test]
    async fn update_of_missing_book_is_an_update_error() {
        let backend = InMemoryBackend::new();
        let change = StatusChange::to(BookStatus::Completed, Utc::now());
        let err = backend.update_book_status("x", &change).await.unwrap_err();
        assert!(matches!(err, ShelfError::Update(_)));
        assert_eq!(backend.status_updates().await.len(), 1);
    }

    #[tokio::test]
    async fn stats_update_creates_row_when_missing() {
        let backend = InMemoryBackend::new();
        backend
            .update_stats(
                "u1",
                ShelfCounts {
                    to_read: 2,
                    completed: 5,
                },
            )
            .await
            .unwrap();
        let stats = backend.get_stats("u1").await.unwrap().unwrap();
        assert_eq!(stats.total_books_to_read, 2);
        assert_eq!(stats.total_books_read, 5);
    }

    #[tokio::test]
    async fn failure_switches_apply() {
        let backend = InMemoryBackend::new()
            .failing_queries()
            .failing_stats_updates();
        assert!(matches!(
            backend.list_books().await,
            Err(ShelfError::Query(_))
        ));
        assert!(matches!(
            backend.update_stats("u1", ShelfCounts::default()).await,
            Err(ShelfError::StatsUpdate(_))
        ));
    }
}
