//! Drag session tracking.
//!
//! A drag gesture is a tiny state machine:
//!
//! ```text
//!   Idle ──pickup(id)──▶ Active(id) ──drop(target)──▶ Idle   (may emit a MoveRequest)
//!                             │
//!                             └──────cancel()───────▶ Idle   (never emits)
//! ```
//!
//! The tracker knows nothing about persistence. A drop only *requests* a
//! move; whether it is a no-op, and whether it sticks, is decided by the
//! transition applier in [`crate::commands::move_book`].

use crate::model::BookStatus;
use crate::store::BookStore;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Active(String),
}

/// Where a card was released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// A droppable container, by its id (`"toRead"` / `"completed"`).
    Container(String),
    /// Another book card; equivalent to dropping on that card's column.
    Card(String),
    /// Released outside any droppable.
    Nowhere,
}

impl DropTarget {
    pub fn column(status: BookStatus) -> Self {
        DropTarget::Container(status.container_id().to_string())
    }

    /// The column this target stands for, if any.
    pub fn resolve(&self, store: &BookStore) -> Option<BookStatus> {
        match self {
            DropTarget::Container(id) => BookStatus::from_container_id(id),
            DropTarget::Card(book_id) => store.get(book_id).ok().map(|r| r.status),
            DropTarget::Nowhere => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    pub record_id: String,
    pub target: BookStatus,
}

impl MoveRequest {
    pub fn new(record_id: impl Into<String>, target: BookStatus) -> Self {
        Self {
            record_id: record_id.into(),
            target,
        }
    }
}

#[derive(Debug, Default)]
pub struct DragTracker {
    state: DragState,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn active_id(&self) -> Option<&str> {
        match &self.state {
            DragState::Active(id) => Some(id),
            DragState::Idle => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state == DragState::Idle
    }

    /// Lift a card. A second pickup replaces the first; only one card is ever held.
    pub fn pickup(&mut self, record_id: impl Into<String>) {
        self.state = DragState::Active(record_id.into());
    }

    /// Release the held card. The session ends whatever the outcome.
    pub fn drop(&mut self, target: &DropTarget, store: &BookStore) -> Option<MoveRequest> {
        let DragState::Active(record_id) = std::mem::take(&mut self.state) else {
            return None;
        };
        let status = target.resolve(store)?;
        Some(MoveRequest {
            record_id,
            target: status,
        })
    }

    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BookRecord;

    fn store() -> BookStore {
        BookStore::from_records(vec![
            BookRecord::new("1", "Dune", "Herbert", BookStatus::ToRead),
            BookRecord::new("2", "Emma", "Austen", BookStatus::Completed),
        ])
    }

    #[test]
    fn starts_idle() {
        let tracker = DragTracker::new();
        assert!(tracker.is_idle());
        assert_eq!(tracker.active_id(), None);
    }

    #[test]
    fn pickup_then_cancel_returns_to_idle() {
        let mut tracker = DragTracker::new();
        tracker.pickup("1");
        assert_eq!(tracker.state(), &DragState::Active("1".into()));

        tracker.cancel();
        assert!(tracker.is_idle());
    }

    #[test]
    fn drop_on_column_requests_move() {
        let mut tracker = DragTracker::new();
        tracker.pickup("1");
        let request = tracker.drop(&DropTarget::column(BookStatus::Completed), &store());
        assert_eq!(request, Some(MoveRequest::new("1", BookStatus::Completed)));
        assert!(tracker.is_idle());
    }

    #[test]
    fn drop_on_card_means_its_column() {
        let mut tracker = DragTracker::new();
        tracker.pickup("1");
        let request = tracker.drop(&DropTarget::Card("2".into()), &store());
        assert_eq!(request, Some(MoveRequest::new("1", BookStatus::Completed)));
    }

    #[test]
    fn drop_on_unknown_container_requests_nothing() {
        let mut tracker = DragTracker::new();
        tracker.pickup("1");
        let request = tracker.drop(&DropTarget::Container("trash".into()), &store());
        assert_eq!(request, None);
        assert!(tracker.is_idle());
    }

    #[test]
    fn drop_nowhere_clears_session() {
        let mut tracker = DragTracker::new();
        tracker.pickup("1");
        assert_eq!(tracker.drop(&DropTarget::Nowhere, &store()), None);
        assert!(tracker.is_idle());
    }

    #[test]
    fn drop_without_pickup_requests_nothing() {
        let mut tracker = DragTracker::new();
        let request = tracker.drop(&DropTarget::column(BookStatus::Completed), &store());
        assert_eq!(request, None);
    }

    #[test]
    fn second_pickup_replaces_first() {
        let mut tracker = DragTracker::new();
        tracker.pickup("1");
        tracker.pickup("2");
        assert_eq!(tracker.active_id(), Some("2"));
    }
}
