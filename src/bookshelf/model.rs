use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two columns of the shelf. A book is always in exactly one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BookStatus {
    ToRead,
    Completed,
}

impl BookStatus {
    pub const ALL: [BookStatus; 2] = [BookStatus::ToRead, BookStatus::Completed];

    /// Column heading shown to the user.
    pub fn label(self) -> &'static str {
        match self {
            BookStatus::ToRead => "To Read",
            BookStatus::Completed => "Completed",
        }
    }

    /// Identifier of the drop container for this column. Also the wire value.
    pub fn container_id(self) -> &'static str {
        match self {
            BookStatus::ToRead => "toRead",
            BookStatus::Completed => "completed",
        }
    }

    pub fn from_container_id(id: &str) -> Option<Self> {
        BookStatus::ALL
            .into_iter()
            .find(|status| status.container_id() == id)
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BookStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(status) = BookStatus::from_container_id(s) {
            return Ok(status);
        }
        match s.to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "toread" | "r" => Ok(BookStatus::ToRead),
            "completed" | "done" | "read" | "c" => Ok(BookStatus::Completed),
            _ => Err(format!(
                "Unknown column: {} (expected to-read or completed)",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub genre: Option<String>,
    pub status: BookStatus,
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl BookRecord {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        status: BookStatus,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            genre: None,
            status,
            added_at: None,
            completed_at: None,
        }
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_added_at(mut self, added_at: DateTime<Utc>) -> Self {
        self.added_at = Some(added_at);
        self
    }
}

/// A status write: what gets persisted and, once that succeeds, applied locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: BookStatus,
    pub completed_at: Option<DateTime<Utc>>,
}

impl StatusChange {
    /// Completing stamps `completed_at`; moving back to To Read clears it.
    pub fn to(status: BookStatus, now: DateTime<Utc>) -> Self {
        let completed_at = match status {
            BookStatus::Completed => Some(now),
            BookStatus::ToRead => None,
        };
        Self {
            status,
            completed_at,
        }
    }
}

/// Per-column counts derived from the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShelfCounts {
    pub to_read: usize,
    pub completed: usize,
}

impl ShelfCounts {
    pub fn total(&self) -> usize {
        self.to_read + self.completed
    }
}

/// The `reading_stats` row kept by the backend for each user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingStats {
    pub user_id: String,
    #[serde(default)]
    pub total_books_read: u32,
    #[serde(default)]
    pub total_books_to_read: u32,
    #[serde(default)]
    pub favorite_genre: Option<String>,
    #[serde(default)]
    pub reading_streak: u32,
}

impl ReadingStats {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            total_books_read: 0,
            total_books_to_read: 0,
            favorite_genre: None,
            reading_streak: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_as_container_id() {
        let json = serde_json::to_string(&BookStatus::ToRead).unwrap();
        assert_eq!(json, "\"toRead\"");
        let parsed: BookStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(parsed, BookStatus::Completed);
    }

    #[test]
    fn status_rejects_unknown_wire_value() {
        assert!(serde_json::from_str::<BookStatus>("\"reading\"").is_err());
    }

    #[test]
    fn status_parses_cli_spellings() {
        assert_eq!("to-read".parse::<BookStatus>(), Ok(BookStatus::ToRead));
        assert_eq!("To Read".parse::<BookStatus>(), Ok(BookStatus::ToRead));
        assert_eq!("done".parse::<BookStatus>(), Ok(BookStatus::Completed));
        assert!("shelved".parse::<BookStatus>().is_err());
    }

    #[test]
    fn container_ids_are_recognised() {
        assert_eq!(
            BookStatus::from_container_id("toRead"),
            Some(BookStatus::ToRead)
        );
        assert_eq!(BookStatus::from_container_id("book-1"), None);
    }

    #[test]
    fn status_change_stamps_completion_only() {
        let now = Utc::now();
        assert_eq!(
            StatusChange::to(BookStatus::Completed, now).completed_at,
            Some(now)
        );
        assert_eq!(StatusChange::to(BookStatus::ToRead, now).completed_at, None);
    }

    #[test]
    fn record_deserializes_backend_row() {
        let row = r#"{
            "id": "b1",
            "title": "Dune",
            "author": "Frank Herbert",
            "genre": null,
            "status": "toRead",
            "added_at": "2024-01-02T03:04:05Z",
            "completed_at": null,
            "user_id": "u1"
        }"#;
        let record: BookRecord = serde_json::from_str(row).unwrap();
        assert_eq!(record.status, BookStatus::ToRead);
        assert!(record.genre.is_none());
        assert!(record.added_at.is_some());
    }
}
