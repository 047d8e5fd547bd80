//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. Every UI (the
//! terminal client today) goes through [`ShelfApi`] rather than calling
//! commands directly.
//!
//! The facade:
//! - **Owns** the session's [`BookStore`] and [`DragTracker`]
//! - **Normalizes inputs** (selectors like `r2` or a title fragment → book ids)
//! - **Dispatches** to `commands/*.rs` and returns `Result<CmdResult>`
//!
//! It holds no business logic of its own and never prints.
//!
//! ## Identity
//!
//! Operations that act for a user take the [`User`] as an argument. The API
//! does not look the current user up anywhere; the caller asks the session
//! once and passes it in.
//!
//! ## Generic Over ShelfBackend
//!
//! `ShelfApi<B: ShelfBackend>` works the same against
//! [`RestBackend`](crate::backend::rest::RestBackend) in production and
//! [`InMemoryBackend`](crate::backend::memory::InMemoryBackend) in tests.

use crate::backend::ShelfBackend;
use crate::commands::{self, helpers::resolve_selector};
use crate::drag::{DragState, DragTracker, DropTarget, MoveRequest};
use crate::error::Result;
use crate::event_loop::{ShelfHandle, ShelfLoop};
use crate::index::BookSelector;
use crate::model::{BookStatus, ShelfCounts};
use crate::session::User;
use crate::store::BookStore;
use std::sync::Arc;
use tokio::sync::mpsc;

pub struct ShelfApi<B: ShelfBackend> {
    backend: Arc<B>,
    store: BookStore,
    drag: DragTracker,
}

impl<B: ShelfBackend + 'static> ShelfApi<B> {
    pub fn new(backend: B) -> Self {
        Self::from_shared(Arc::new(backend))
    }

    pub fn from_shared(backend: Arc<B>) -> Self {
        Self {
            backend,
            store: BookStore::new(),
            drag: DragTracker::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn store(&self) -> &BookStore {
        &self.store
    }

    pub fn drag_state(&self) -> &DragState {
        self.drag.state()
    }

    pub async fn load(&mut self) -> Result<commands::CmdResult> {
        commands::load::run(&mut self.store, &*self.backend).await
    }

    pub fn list(&self) -> commands::CmdResult {
        commands::list::run(&self.store)
    }

    /// Lift the book named by `selector`. Unknown books leave the tracker idle,
    /// even if another book was held.
    pub fn pickup(&mut self, selector: &str) -> Result<()> {
        match resolve_selector(&self.store, &BookSelector::parse(selector)) {
            Ok(book) => {
                self.drag.pickup(book.id.clone());
                Ok(())
            }
            Err(e) => {
                self.drag.cancel();
                Err(e)
            }
        }
    }

    /// Release the held book on `target`, applying the move it stands for.
    pub async fn drop_on(
        &mut self,
        user: &User,
        target: DropTarget,
    ) -> Result<commands::CmdResult> {
        match self.drag.drop(&target, &self.store) {
            Some(request) => self.apply_move(user, &request).await,
            None => Ok(commands::CmdResult::default()),
        }
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    /// One whole gesture: pick up the selected book and drop it on `status`'s column.
    pub async fn move_book(
        &mut self,
        user: &User,
        selector: &str,
        status: BookStatus,
    ) -> Result<commands::CmdResult> {
        self.pickup(selector)?;
        self.drop_on(user, DropTarget::column(status)).await
    }

    pub async fn apply_move(
        &mut self,
        user: &User,
        request: &MoveRequest,
    ) -> Result<commands::CmdResult> {
        commands::move_book::run(&mut self.store, &*self.backend, user, request).await
    }

    pub fn recalculate(&self) -> ShelfCounts {
        commands::stats::recalculate(&self.store)
    }

    pub async fn sync_stats(&self, user: &User) -> Result<commands::CmdResult> {
        commands::stats::run(&self.store, &*self.backend, user).await
    }

    pub async fn profile(
        &self,
        viewer: Option<&User>,
        user_id: &str,
    ) -> Result<commands::CmdResult> {
        commands::profile::run(&*self.backend, viewer, user_id).await
    }

    /// Hand the loaded shelf to an event loop for an interactive session.
    pub fn into_loop(
        self,
        user: User,
    ) -> (
        ShelfLoop<B>,
        ShelfHandle,
        mpsc::UnboundedReceiver<commands::CmdMessage>,
    ) {
        ShelfLoop::new(self.store, self.backend, user)
    }
}

pub fn config(
    paths: &commands::ShelfPaths,
    action: ConfigAction,
) -> Result<commands::CmdResult> {
    commands::config::run(paths, action)
}

pub use crate::commands::config::ConfigAction;
pub use commands::{CmdMessage, CmdResult, MessageLevel, ProfileView, ShelfPaths};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::fixtures::books;
    use crate::backend::memory::InMemoryBackend;
    use crate::error::ShelfError;

    async fn api() -> ShelfApi<InMemoryBackend> {
        let backend = InMemoryBackend::new().with_books(books(&[
            ("1", "Dune", BookStatus::ToRead),
            ("2", "Emma", BookStatus::Completed),
        ]));
        let mut api = ShelfApi::new(backend);
        api.load().await.unwrap();
        api
    }

    #[tokio::test]
    async fn move_book_resolves_index_and_dispatches() {
        let mut api = api().await;
        let user = User::new("u1");

        let result = api
            .move_book(&user, "r1", BookStatus::Completed)
            .await
            .unwrap();

        assert_eq!(result.affected_books[0].id, "1");
        assert_eq!(api.store().get("1").unwrap().status, BookStatus::Completed);
        assert_eq!(api.drag_state(), &DragState::Idle);
        assert_eq!(api.backend().status_updates().await.len(), 1);
    }

    #[tokio::test]
    async fn unknown_selector_leaves_tracker_idle() {
        let mut api = api().await;
        let err = api.pickup("r9").unwrap_err();
        assert!(matches!(err, ShelfError::Selector(_)));
        assert_eq!(api.drag_state(), &DragState::Idle);
    }

    #[tokio::test]
    async fn failed_pickup_drops_the_held_book() {
        let mut api = api().await;
        api.pickup("Dune").unwrap();

        assert!(api.pickup("Moby Dick").is_err());
        assert_eq!(api.drag_state(), &DragState::Idle);

        let result = api
            .drop_on(&User::new("u1"), DropTarget::column(BookStatus::Completed))
            .await
            .unwrap();
        assert!(result.messages.is_empty());
        assert_eq!(api.store().get("1").unwrap().status, BookStatus::ToRead);
        assert!(api.backend().status_updates().await.is_empty());
    }

    #[tokio::test]
    async fn pickup_then_cancel_applies_nothing() {
        let mut api = api().await;
        api.pickup("Dune").unwrap();
        api.cancel_drag();

        let result = api
            .drop_on(&User::new("u1"), DropTarget::column(BookStatus::Completed))
            .await
            .unwrap();

        assert!(result.messages.is_empty());
        assert!(api.backend().status_updates().await.is_empty());
    }

    #[tokio::test]
    async fn recalculate_reflects_store() {
        let api = api().await;
        let counts = api.recalculate();
        assert_eq!((counts.to_read, counts.completed), (1, 1));
    }
}
