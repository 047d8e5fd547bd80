//! # Display Indexes
//!
//! Backend ids are opaque strings nobody wants to type. On the terminal each
//! book gets a short index scoped to its column, in shelf order:
//!
//! ```text
//!   To Read          Completed
//!   r1. Dune         c1. Emma
//!   r2. Ulysses      c2. Beloved
//! ```
//!
//! Indexes are recomputed from the store every time, so they shift when a
//! book changes column. A [`BookSelector`] also accepts a raw id or a title
//! fragment, which is what scripts should use.

use crate::model::{BookRecord, BookStatus};
use crate::store::BookStore;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayIndex {
    ToRead(usize),
    Completed(usize),
}

impl DisplayIndex {
    pub fn status(&self) -> BookStatus {
        match self {
            DisplayIndex::ToRead(_) => BookStatus::ToRead,
            DisplayIndex::Completed(_) => BookStatus::Completed,
        }
    }

    fn position(&self) -> usize {
        match self {
            DisplayIndex::ToRead(n) | DisplayIndex::Completed(n) => *n,
        }
    }
}

impl fmt::Display for DisplayIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayIndex::ToRead(i) => write!(f, "r{}", i),
            DisplayIndex::Completed(i) => write!(f, "c{}", i),
        }
    }
}

impl FromStr for DisplayIndex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = if let Some(rest) = s.strip_prefix('r') {
            rest.parse().ok().map(DisplayIndex::ToRead)
        } else if let Some(rest) = s.strip_prefix('c') {
            rest.parse().ok().map(DisplayIndex::Completed)
        } else {
            None
        };
        match parsed {
            Some(idx) if idx.position() > 0 => Ok(idx),
            _ => Err(format!("Invalid index format: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DisplayBook {
    pub book: BookRecord,
    pub index: DisplayIndex,
}

/// Assigns column indexes in store order: every To Read book, then every Completed one.
pub fn index_books(store: &BookStore) -> Vec<DisplayBook> {
    BookStatus::ALL
        .into_iter()
        .flat_map(|status| {
            store
                .with_status(status)
                .enumerate()
                .map(move |(i, book)| DisplayBook {
                    book: book.clone(),
                    index: match status {
                        BookStatus::ToRead => DisplayIndex::ToRead(i + 1),
                        BookStatus::Completed => DisplayIndex::Completed(i + 1),
                    },
                })
        })
        .collect()
}

/// User input naming a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookSelector {
    Index(DisplayIndex),
    /// Exact id, or failing that, a title fragment.
    Text(String),
}

impl BookSelector {
    pub fn parse(input: &str) -> Self {
        match DisplayIndex::from_str(input) {
            Ok(idx) => BookSelector::Index(idx),
            Err(_) => BookSelector::Text(input.to_string()),
        }
    }
}

impl fmt::Display for BookSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookSelector::Index(idx) => write!(f, "{}", idx),
            BookSelector::Text(t) => write!(f, "\"{}\"", t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> BookStore {
        BookStore::from_records(vec![
            BookRecord::new("a", "Dune", "Herbert", BookStatus::ToRead),
            BookRecord::new("b", "Emma", "Austen", BookStatus::Completed),
            BookRecord::new("c", "Ulysses", "Joyce", BookStatus::ToRead),
        ])
    }

    #[test]
    fn parses_column_indexes() {
        assert_eq!("r1".parse::<DisplayIndex>(), Ok(DisplayIndex::ToRead(1)));
        assert_eq!(
            "c12".parse::<DisplayIndex>(),
            Ok(DisplayIndex::Completed(12))
        );
        assert!("r0".parse::<DisplayIndex>().is_err());
        assert!("x1".parse::<DisplayIndex>().is_err());
        assert!("rust".parse::<DisplayIndex>().is_err());
    }

    #[test]
    fn display_round_trips() {
        assert_eq!(DisplayIndex::ToRead(3).to_string(), "r3");
        assert_eq!(DisplayIndex::Completed(1).to_string(), "c1");
    }

    #[test]
    fn indexes_each_column_in_store_order() {
        let indexed = index_books(&store());
        let labels: Vec<_> = indexed
            .iter()
            .map(|db| format!("{}={}", db.index, db.book.id))
            .collect();
        assert_eq!(labels, vec!["r1=a", "r2=c", "c1=b"]);
    }

    #[test]
    fn selector_falls_back_to_text() {
        assert_eq!(
            BookSelector::parse("c2"),
            BookSelector::Index(DisplayIndex::Completed(2))
        );
        assert_eq!(
            BookSelector::parse("dune"),
            BookSelector::Text("dune".into())
        );
    }
}
