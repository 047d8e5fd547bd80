use crate::commands::CmdResult;
use crate::index::index_books;
use crate::store::BookStore;

pub fn run(store: &BookStore) -> CmdResult {
    CmdResult::default()
        .with_listed_books(index_books(store))
        .with_counts(store.counts())
}
