use crate::backend::ShelfBackend;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::BookStore;
use tracing::{error, info};

/// Refresh the store wholesale from the backend.
///
/// A failed query leaves the shelf empty and raises a sticky notification;
/// it is not returned as an error because the session stays usable.
pub async fn run<B: ShelfBackend + ?Sized>(
    store: &mut BookStore,
    backend: &B,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    match backend.list_books().await {
        Ok(records) => {
            info!(count = records.len(), "loaded shelf");
            store.load(records);
            result.counts = Some(store.counts());
        }
        Err(e) => {
            error!(error = %e, "failed to load books");
            store.clear();
            result.add_message(CmdMessage::error("Failed to load books").sticky());
        }
    }
    Ok(result)
}
