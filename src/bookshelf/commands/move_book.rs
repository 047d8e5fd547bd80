//! # Transition Applier
//!
//! Moves one book to the other column. The backend is written **first**; the
//! local store only changes once that write succeeds. There is no optimistic
//! update, so there is never anything to roll back: on failure the store is
//! exactly what it was and the card simply stays in its original column.
//!
//! The work is split in three so the event loop can suspend in the middle:
//!
//! 1. [`plan`] (sync): check the record exists, short-circuit same-column
//!    drops, and fix the [`StatusChange`] to send.
//! 2. [`persist`] (async): the only network call.
//! 3. [`settle`] (sync): commit to the store and produce notifications, plus
//!    the fresh stats to push when the move stuck.
//!
//! [`run`] chains the three for callers that can simply await.
//!
//! Stats are recalculated strictly after the store commit and never when the
//! backend refused the move. Every backend failure, whatever its cause,
//! surfaces as the same "Failed to update book" notification.

use crate::backend::ShelfBackend;
use crate::commands::{stats, CmdMessage, CmdResult};
use crate::drag::MoveRequest;
use crate::error::Result;
use crate::model::{BookStatus, ShelfCounts, StatusChange};
use crate::session::User;
use crate::store::BookStore;
use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

pub const UPDATE_FAILED: &str = "Failed to update book";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMove {
    pub record_id: String,
    pub title: String,
    pub from: BookStatus,
    pub change: StatusChange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovePlan {
    /// Already in the target column: nothing to send, nothing to say.
    Noop,
    Persist(PendingMove),
}

pub fn plan(store: &BookStore, request: &MoveRequest, now: DateTime<Utc>) -> Result<MovePlan> {
    let record = store.get(&request.record_id)?;
    if record.status == request.target {
        debug!(id = %record.id, status = ?record.status, "drop on own column");
        return Ok(MovePlan::Noop);
    }
    Ok(MovePlan::Persist(PendingMove {
        record_id: record.id.clone(),
        title: record.title.clone(),
        from: record.status,
        change: StatusChange::to(request.target, now),
    }))
}

pub async fn persist<B: ShelfBackend + ?Sized>(
    backend: &B,
    pending: &PendingMove,
) -> Result<()> {
    debug!(id = %pending.record_id, to = ?pending.change.status, "persisting move");
    backend
        .update_book_status(&pending.record_id, &pending.change)
        .await
}

#[derive(Debug, Default)]
pub struct Settlement {
    pub result: CmdResult,
    /// Present only when the store changed; these are the counts to push.
    pub counts: Option<ShelfCounts>,
}

pub fn settle(store: &mut BookStore, pending: &PendingMove, outcome: Result<()>) -> Settlement {
    let mut settlement = Settlement::default();

    if let Err(e) = outcome {
        error!(id = %pending.record_id, error = %e, "error updating book");
        settlement.result.add_message(CmdMessage::error(UPDATE_FAILED));
        return settlement;
    }

    if let Err(e) = store.apply_change(&pending.record_id, &pending.change) {
        // The shelf was reloaded or cleared while the write was in flight.
        warn!(id = %pending.record_id, error = %e, "moved book is no longer on the shelf");
        return settlement;
    }

    info!(id = %pending.record_id, from = ?pending.from, to = ?pending.change.status, "book moved");
    if let Ok(record) = store.get(&pending.record_id) {
        settlement.result = CmdResult::default().with_affected_books(vec![record.clone()]);
    }
    let counts = stats::recalculate(store);
    settlement.counts = Some(counts);
    settlement.result.counts = Some(counts);
    settlement.result.add_message(CmdMessage::success(format!(
        "Moved \"{}\" to {}!",
        pending.title,
        pending.change.status.label()
    )));
    settlement
}

/// Apply a move end to end: plan, persist, settle, then push stats.
pub async fn run<B: ShelfBackend + ?Sized>(
    store: &mut BookStore,
    backend: &B,
    user: &User,
    request: &MoveRequest,
) -> Result<CmdResult> {
    let pending = match plan(store, request, Utc::now())? {
        MovePlan::Noop => return Ok(CmdResult::default()),
        MovePlan::Persist(pending) => pending,
    };

    let outcome = persist(backend, &pending).await;
    let settlement = settle(store, &pending, outcome);

    if let Some(counts) = settlement.counts {
        stats::push(backend, user, counts).await;
    }
    Ok(settlement.result)
}
