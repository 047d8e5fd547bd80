use crate::config::ShelfConfig;
use crate::index::DisplayBook;
use crate::model::{BookRecord, ShelfCounts};
use std::path::PathBuf;

pub mod config;
pub mod helpers;
pub mod list;
pub mod load;
pub mod move_book;
pub mod profile;
pub mod stats;

pub use profile::ProfileView;

#[derive(Debug, Clone)]
pub struct ShelfPaths {
    pub config_dir: PathBuf,
}

impl ShelfPaths {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A user-facing notification. Sticky ones stay up until dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
    pub sticky: bool,
}

impl CmdMessage {
    fn new(level: MessageLevel, content: impl Into<String>) -> Self {
        Self {
            level,
            content: content.into(),
            sticky: false,
        }
    }

    pub fn info(content: impl Into<String>) -> Self {
        Self::new(MessageLevel::Info, content)
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self::new(MessageLevel::Success, content)
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self::new(MessageLevel::Warning, content)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(MessageLevel::Error, content)
    }

    pub fn sticky(mut self) -> Self {
        self.sticky = true;
        self
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_books: Vec<BookRecord>,
    pub listed_books: Vec<DisplayBook>,
    pub counts: Option<ShelfCounts>,
    pub profile: Option<ProfileView>,
    pub config: Option<ShelfConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn has_errors(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.level == MessageLevel::Error)
    }

    pub fn with_affected_books(mut self, books: Vec<BookRecord>) -> Self {
        self.affected_books = books;
        self
    }

    pub fn with_listed_books(mut self, books: Vec<DisplayBook>) -> Self {
        self.listed_books = books;
        self
    }

    pub fn with_counts(mut self, counts: ShelfCounts) -> Self {
        self.counts = Some(counts);
        self
    }

    pub fn with_profile(mut self, profile: ProfileView) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn with_config(mut self, config: ShelfConfig) -> Self {
        self.config = Some(config);
        self
    }
}
