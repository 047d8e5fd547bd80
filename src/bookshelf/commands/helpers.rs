use crate::error::{Result, ShelfError};
use crate::index::{index_books, BookSelector};
use crate::model::BookRecord;
use crate::store::BookStore;

/// Resolve a selector to exactly one book in the store.
pub fn resolve_selector<'a>(
    store: &'a BookStore,
    selector: &BookSelector,
) -> Result<&'a BookRecord> {
    match selector {
        BookSelector::Index(idx) => {
            let id = index_books(store)
                .into_iter()
                .find(|db| &db.index == idx)
                .map(|db| db.book.id)
                .ok_or_else(|| {
                    ShelfError::Selector(format!("Index {} not found on the shelf", idx))
                })?;
            store.get(&id)
        }
        BookSelector::Text(text) => {
            if let Ok(book) = store.get(text) {
                return Ok(book);
            }
            let needle = text.to_lowercase();
            let mut matches = store
                .all()
                .filter(|b| b.title.to_lowercase().contains(&needle));
            match (matches.next(), matches.next()) {
                (Some(book), None) => Ok(book),
                (None, _) => Err(ShelfError::Selector(format!(
                    "No book matches {}",
                    selector
                ))),
                (Some(_), Some(_)) => Err(ShelfError::Selector(format!(
                    "{} matches more than one book; use its index",
                    selector
                ))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::DisplayIndex;
    use crate::model::BookStatus;

    fn store() -> BookStore {
        BookStore::from_records(vec![
            BookRecord::new("id-1", "The Left Hand of Darkness", "Le Guin", BookStatus::ToRead),
            BookRecord::new("id-2", "The Dispossessed", "Le Guin", BookStatus::Completed),
            BookRecord::new("id-3", "Dune", "Herbert", BookStatus::ToRead),
        ])
    }

    #[test]
    fn resolves_index() {
        let store = store();
        let book = resolve_selector(&store, &BookSelector::Index(DisplayIndex::ToRead(2))).unwrap();
        assert_eq!(book.id, "id-3");
    }

    #[test]
    fn missing_index_is_an_error() {
        let store = store();
        let err = resolve_selector(&store, &BookSelector::Index(DisplayIndex::Completed(4)))
            .unwrap_err();
        assert!(matches!(err, ShelfError::Selector(_)));
    }

    #[test]
    fn resolves_exact_id_before_title() {
        let store = store();
        let book = resolve_selector(&store, &BookSelector::Text("id-2".into())).unwrap();
        assert_eq!(book.title, "The Dispossessed");
    }

    #[test]
    fn resolves_unique_title_fragment() {
        let store = store();
        let book = resolve_selector(&store, &BookSelector::Text("DUNE".into())).unwrap();
        assert_eq!(book.id, "id-3");
    }

    #[test]
    fn ambiguous_title_is_rejected() {
        let store = store();
        let err = resolve_selector(&store, &BookSelector::Text("the".into())).unwrap_err();
        assert!(err.to_string().contains("more than one"));
    }
}
