//! Reading stats are a projection of the shelf, recomputed after every
//! committed move and pushed to the backend on a best-effort basis.

use crate::backend::ShelfBackend;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::ShelfCounts;
use crate::session::User;
use crate::store::BookStore;
use tracing::{debug, warn};

pub fn recalculate(store: &BookStore) -> ShelfCounts {
    store.counts()
}

/// Send `counts` for `user`. Failures are logged, never surfaced.
///
/// Returns whether the backend accepted the write.
pub async fn push<B: ShelfBackend + ?Sized>(
    backend: &B,
    user: &User,
    counts: ShelfCounts,
) -> bool {
    match backend.update_stats(&user.id, counts).await {
        Ok(()) => {
            debug!(
                user_id = %user.id,
                to_read = counts.to_read,
                completed = counts.completed,
                "stats pushed"
            );
            true
        }
        Err(e) => {
            warn!(user_id = %user.id, error = %e, "failed to push reading stats");
            false
        }
    }
}

/// Recalculate and push in one go, reporting the counts.
pub async fn run<B: ShelfBackend + ?Sized>(
    store: &BookStore,
    backend: &B,
    user: &User,
) -> Result<CmdResult> {
    let counts = recalculate(store);
    let mut result = CmdResult::default().with_counts(counts);
    if push(backend, user, counts).await {
        result.add_message(CmdMessage::info("Reading stats synced"));
    }
    Ok(result)
}
