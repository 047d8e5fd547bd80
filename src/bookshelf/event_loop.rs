//! # Shelf Event Loop
//!
//! The interactive session runs on one logical thread. Gestures arrive as
//! [`ShelfEvent`]s on an unbounded channel and are handled one at a time by
//! [`ShelfLoop::run`], which is the only code that touches the store and the
//! drag tracker.
//!
//! Backend calls are the only things that suspend. They run as spawned tasks
//! that hold nothing but an `Arc` of the backend and the data they need, and
//! post their outcome back onto the same channel:
//!
//! ```text
//!   Drop ──plan──▶ spawn(persist) ─ ─ ─ ─▶ MoveSettled ──settle──▶ spawn(push stats) ─ ─▶ StatsSettled
//!        (loop)      (task)                  (loop)                    (task)               (loop)
//! ```
//!
//! Gestures are not serialised against each other: a second drop can be sent
//! while the first write is still in flight, and the two may settle in either
//! order. Each only touches its own record. Stats pushes race the same way
//! and the backend keeps whichever lands last.
//!
//! Nothing in flight is ever cancelled. [`ShelfHandle::shutdown`] stops
//! accepting gestures and the loop returns once every spawned task has
//! reported back. Signing out clears the shelf and shuts the loop down the
//! same way.

use crate::backend::ShelfBackend;
use crate::commands::helpers::resolve_selector;
use crate::commands::move_book::{self, MovePlan, PendingMove};
use crate::commands::{list, stats, CmdMessage, CmdResult};
use crate::drag::{DragTracker, DropTarget, MoveRequest};
use crate::error::{Result, ShelfError};
use crate::index::BookSelector;
use crate::model::ShelfCounts;
use crate::session::{SessionState, User};
use crate::store::BookStore;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

#[derive(Debug)]
pub enum ShelfEvent {
    Pickup(BookSelector),
    Drop(DropTarget),
    /// Drop onto another card, named the way the user named it.
    DropOnBook(BookSelector),
    Cancel,
    MoveSettled {
        pending: PendingMove,
        outcome: Result<()>,
    },
    StatsSettled {
        counts: ShelfCounts,
        accepted: bool,
    },
    Snapshot(oneshot::Sender<CmdResult>),
    Shutdown,
}

/// Cheap, cloneable sender for gestures.
#[derive(Clone)]
pub struct ShelfHandle {
    tx: mpsc::UnboundedSender<ShelfEvent>,
}

impl ShelfHandle {
    fn send(&self, event: ShelfEvent) -> Result<()> {
        self.tx
            .send(event)
            .map_err(|_| ShelfError::Api("shelf loop has stopped".into()))
    }

    pub fn pickup(&self, selector: BookSelector) -> Result<()> {
        self.send(ShelfEvent::Pickup(selector))
    }

    pub fn drop_on(&self, target: DropTarget) -> Result<()> {
        self.send(ShelfEvent::Drop(target))
    }

    pub fn drop_on_book(&self, selector: BookSelector) -> Result<()> {
        self.send(ShelfEvent::DropOnBook(selector))
    }

    pub fn cancel(&self) -> Result<()> {
        self.send(ShelfEvent::Cancel)
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send(ShelfEvent::Shutdown)
    }

    /// The shelf as the loop currently sees it.
    pub async fn snapshot(&self) -> Result<CmdResult> {
        let (reply, rx) = oneshot::channel();
        self.send(ShelfEvent::Snapshot(reply))?;
        rx.await
            .map_err(|_| ShelfError::Api("shelf loop has stopped".into()))
    }
}

pub struct ShelfLoop<B: ShelfBackend + 'static> {
    store: BookStore,
    tracker: DragTracker,
    backend: Arc<B>,
    user: User,
    tx: mpsc::UnboundedSender<ShelfEvent>,
    rx: mpsc::UnboundedReceiver<ShelfEvent>,
    notices: mpsc::UnboundedSender<CmdMessage>,
    moves_in_flight: usize,
    stats_in_flight: usize,
    closing: bool,
}

impl<B: ShelfBackend + 'static> ShelfLoop<B> {
    /// Build a loop over an already loaded store.
    ///
    /// Returns the loop, a handle for sending gestures, and the stream of
    /// notifications the loop emits.
    pub fn new(
        store: BookStore,
        backend: Arc<B>,
        user: User,
    ) -> (Self, ShelfHandle, mpsc::UnboundedReceiver<CmdMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (notices, notices_rx) = mpsc::unbounded_channel();
        let handle = ShelfHandle { tx: tx.clone() };
        let shelf_loop = Self {
            store,
            tracker: DragTracker::new(),
            backend,
            user,
            tx,
            rx,
            notices,
            moves_in_flight: 0,
            stats_in_flight: 0,
            closing: false,
        };
        (shelf_loop, handle, notices_rx)
    }

    /// Process events until shut down or signed out. Returns the final shelf.
    pub async fn run(mut self, mut session: watch::Receiver<SessionState>) -> BookStore {
        let mut watching_session = true;
        let initial = session.borrow_and_update().clone();
        self.check_session(&initial);

        loop {
            if self.closing && self.moves_in_flight == 0 && self.stats_in_flight == 0 {
                break;
            }
            tokio::select! {
                event = self.rx.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
                changed = session.changed(), if watching_session && !self.closing => {
                    match changed {
                        Ok(()) => {
                            let state = session.borrow_and_update().clone();
                            self.check_session(&state);
                        }
                        Err(_) => watching_session = false,
                    }
                }
            }
        }

        info!("shelf loop stopped");
        self.store
    }

    fn check_session(&mut self, state: &SessionState) {
        let still_ours = state.user().is_some_and(|u| u.id == self.user.id);
        if !still_ours {
            info!(user_id = %self.user.id, "session ended, closing shelf");
            self.store.clear();
            self.tracker.cancel();
            self.closing = true;
        }
    }

    fn notify(&self, message: CmdMessage) {
        // Nobody listening is fine.
        let _ = self.notices.send(message);
    }

    fn handle_event(&mut self, event: ShelfEvent) {
        match event {
            ShelfEvent::Pickup(selector) => self.pickup(&selector),
            ShelfEvent::Drop(target) => self.drop_on(&target),
            ShelfEvent::DropOnBook(selector) => {
                let target = match resolve_selector(&self.store, &selector) {
                    Ok(book) => DropTarget::Card(book.id.clone()),
                    Err(_) => DropTarget::Nowhere,
                };
                self.drop_on(&target);
            }
            ShelfEvent::Cancel => {
                debug!("drag cancelled");
                self.tracker.cancel();
            }
            ShelfEvent::MoveSettled { pending, outcome } => {
                self.moves_in_flight -= 1;
                self.settle(pending, outcome);
            }
            ShelfEvent::StatsSettled { counts, accepted } => {
                self.stats_in_flight -= 1;
                debug!(
                    to_read = counts.to_read,
                    completed = counts.completed,
                    accepted,
                    "stats push settled"
                );
            }
            ShelfEvent::Snapshot(reply) => {
                let _ = reply.send(list::run(&self.store));
            }
            ShelfEvent::Shutdown => {
                debug!(
                    moves = self.moves_in_flight,
                    stats = self.stats_in_flight,
                    "shutdown requested"
                );
                self.tracker.cancel();
                self.closing = true;
            }
        }
    }

    fn pickup(&mut self, selector: &BookSelector) {
        if self.closing {
            return;
        }
        match resolve_selector(&self.store, selector) {
            Ok(book) => {
                debug!(id = %book.id, "picked up");
                self.tracker.pickup(book.id.clone());
            }
            Err(e) => {
                self.tracker.cancel();
                self.notify(CmdMessage::warning(e.to_string()));
            }
        }
    }

    fn drop_on(&mut self, target: &DropTarget) {
        let Some(request) = self.tracker.drop(target, &self.store) else {
            debug!(?target, "drop without a move");
            return;
        };
        self.start_move(request);
    }

    fn start_move(&mut self, request: MoveRequest) {
        let pending = match move_book::plan(&self.store, &request, Utc::now()) {
            Ok(MovePlan::Persist(pending)) => pending,
            Ok(MovePlan::Noop) => return,
            Err(e) => {
                warn!(id = %request.record_id, error = %e, "move for a book not on the shelf");
                return;
            }
        };

        self.moves_in_flight += 1;
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = move_book::persist(&*backend, &pending).await;
            let _ = tx.send(ShelfEvent::MoveSettled { pending, outcome });
        });
    }

    fn settle(&mut self, pending: PendingMove, outcome: Result<()>) {
        let settlement = move_book::settle(&mut self.store, &pending, outcome);
        for message in settlement.result.messages {
            self.notify(message);
        }
        let Some(counts) = settlement.counts else {
            return;
        };

        self.stats_in_flight += 1;
        let backend = Arc::clone(&self.backend);
        let user = self.user.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let accepted = stats::push(&*backend, &user, counts).await;
            let _ = tx.send(ShelfEvent::StatsSettled { counts, accepted });
        });
    }
}
