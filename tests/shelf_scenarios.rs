use bookshelf::api::{MessageLevel, ShelfApi};
use bookshelf::backend::memory::InMemoryBackend;
use bookshelf::drag::{DragState, DropTarget};
use bookshelf::index::BookSelector;
use bookshelf::model::{BookRecord, BookStatus, Profile, ReadingStats, ShelfCounts};
use bookshelf::session::{AuthSession, SessionHandle, User};
use chrono::{Duration, TimeZone, Utc};

fn shelf(entries: &[(&str, &str, BookStatus)]) -> Vec<BookRecord> {
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    entries
        .iter()
        .enumerate()
        .map(|(i, (id, title, status))| {
            BookRecord::new(*id, *title, "Anon", *status)
                .with_added_at(base + Duration::hours(i as i64))
        })
        .collect()
}

async fn loaded(backend: InMemoryBackend) -> ShelfApi<InMemoryBackend> {
    let mut api = ShelfApi::new(backend);
    let result = api.load().await.unwrap();
    assert!(!result.has_errors());
    api
}

#[tokio::test]
async fn successful_move_commits_and_pushes_stats() {
    let backend = InMemoryBackend::new().with_books(shelf(&[("1", "Dune", BookStatus::ToRead)]));
    let mut api = loaded(backend).await;
    let user = User::new("reader");

    let result = api
        .move_book(&user, "1", BookStatus::Completed)
        .await
        .unwrap();

    let book = api.store().get("1").unwrap();
    assert_eq!(book.status, BookStatus::Completed);
    assert!(book.completed_at.is_some());
    assert_eq!(result.messages[0].level, MessageLevel::Success);
    assert_eq!(
        api.backend().stats_updates().await,
        vec![(
            "reader".to_string(),
            ShelfCounts {
                to_read: 0,
                completed: 1
            }
        )]
    );
}

#[tokio::test]
async fn failed_move_keeps_store_and_skips_stats() {
    let backend = InMemoryBackend::new()
        .with_books(shelf(&[("1", "Dune", BookStatus::ToRead)]))
        .failing_updates();
    let mut api = loaded(backend).await;

    let result = api
        .move_book(&User::new("reader"), "1", BookStatus::Completed)
        .await
        .unwrap();

    assert_eq!(api.store().get("1").unwrap().status, BookStatus::ToRead);
    assert!(api.backend().stats_updates().await.is_empty());
    let errors: Vec<_> = result
        .messages
        .iter()
        .filter(|m| m.level == MessageLevel::Error)
        .collect();
    assert_eq!(errors.len(), 1);
}

#[tokio::test]
async fn retry_succeeds_once_backend_recovers() {
    let backend = InMemoryBackend::new()
        .with_books(shelf(&[("1", "Dune", BookStatus::ToRead)]))
        .failing_updates();
    let mut api = loaded(backend).await;
    let user = User::new("reader");

    let first = api.move_book(&user, "Dune", BookStatus::Completed).await.unwrap();
    assert!(first.has_errors());
    assert_eq!(api.store().get("1").unwrap().status, BookStatus::ToRead);

    api.backend().set_fail_updates(false).await;
    let second = api.move_book(&user, "Dune", BookStatus::Completed).await.unwrap();

    assert!(!second.has_errors());
    assert_eq!(second.affected_books[0].status, BookStatus::Completed);
    assert_eq!(api.backend().status_updates().await.len(), 2);
    assert_eq!(api.backend().stats_updates().await.len(), 1);
}

#[tokio::test]
async fn move_keeps_the_rest_of_the_record() {
    let book = BookRecord::new("1", "Dune", "Frank Herbert", BookStatus::ToRead)
        .with_genre("Science Fiction");
    let backend = InMemoryBackend::new().with_books(vec![book]);
    let mut api = loaded(backend).await;

    api.move_book(&User::new("reader"), "r1", BookStatus::Completed)
        .await
        .unwrap();

    let moved = api.store().get("1").unwrap();
    assert_eq!(moved.status, BookStatus::Completed);
    assert_eq!(moved.genre.as_deref(), Some("Science Fiction"));
    assert_eq!(moved.author, "Frank Herbert");
}

#[tokio::test]
async fn moving_back_to_read_clears_completion_time() {
    let backend = InMemoryBackend::new().with_books(shelf(&[("1", "Emma", BookStatus::ToRead)]));
    let mut api = loaded(backend).await;
    let user = User::new("reader");

    api.move_book(&user, "Emma", BookStatus::Completed).await.unwrap();
    api.move_book(&user, "c1", BookStatus::ToRead).await.unwrap();

    let book = api.store().get("1").unwrap();
    assert_eq!(book.status, BookStatus::ToRead);
    assert_eq!(book.completed_at, None);
    assert_eq!(api.backend().book("1").await.unwrap().completed_at, None);
}

#[tokio::test]
async fn counts_always_cover_the_whole_shelf() {
    let backend = InMemoryBackend::new().with_books(shelf(&[
        ("1", "Dune", BookStatus::ToRead),
        ("2", "Emma", BookStatus::Completed),
        ("3", "Ulysses", BookStatus::ToRead),
    ]));
    let mut api = loaded(backend).await;
    let user = User::new("reader");

    api.move_book(&user, "r1", BookStatus::Completed).await.unwrap();

    let counts = api.recalculate();
    assert_eq!(counts.total(), api.store().len());
    assert_eq!((counts.to_read, counts.completed), (1, 2));
}

#[tokio::test]
async fn pickup_then_cancel_is_idle_and_writes_nothing() {
    let backend = InMemoryBackend::new().with_books(shelf(&[("1", "Dune", BookStatus::ToRead)]));
    let mut api = loaded(backend).await;

    api.pickup("1").unwrap();
    assert_eq!(api.drag_state(), &DragState::Active("1".into()));
    api.cancel_drag();

    assert_eq!(api.drag_state(), &DragState::Idle);
    assert!(api.backend().status_updates().await.is_empty());
}

#[tokio::test]
async fn dropping_on_own_column_is_silent() {
    let backend = InMemoryBackend::new().with_books(shelf(&[("1", "Dune", BookStatus::ToRead)]));
    let mut api = loaded(backend).await;

    api.pickup("r1").unwrap();
    let result = api
        .drop_on(&User::new("reader"), DropTarget::column(BookStatus::ToRead))
        .await
        .unwrap();

    assert!(result.messages.is_empty());
    assert!(api.backend().status_updates().await.is_empty());
    assert!(api.backend().stats_updates().await.is_empty());
}

#[tokio::test]
async fn failed_load_leaves_empty_shelf_with_sticky_error() {
    let mut api = ShelfApi::new(InMemoryBackend::new().failing_queries());
    let result = api.load().await.unwrap();

    assert!(api.store().is_empty());
    assert!(result.has_errors());
    assert!(result.messages[0].sticky);
}

#[tokio::test]
async fn profile_includes_stats_for_owner() {
    let created = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
    let mut stats = ReadingStats::new("reader");
    stats.total_books_read = 4;
    let backend = InMemoryBackend::new()
        .with_profile(Profile {
            id: "reader".into(),
            username: "bookworm".into(),
            bio: None,
            avatar_url: None,
            created_at: created,
        })
        .with_stats(stats);
    let api = ShelfApi::new(backend);
    let user = User::new("reader");

    let result = api.profile(Some(&user), "reader").await.unwrap();

    let view = result.profile.unwrap();
    assert!(view.is_own);
    assert_eq!(view.stats.unwrap().total_books_read, 4);
}

#[tokio::test]
async fn interactive_session_commits_and_stops_on_sign_out() {
    let backend = InMemoryBackend::new().with_books(shelf(&[
        ("1", "Dune", BookStatus::ToRead),
        ("2", "Emma", BookStatus::Completed),
    ]));
    let api = loaded(backend).await;
    let user = User::new("reader");
    let session = SessionHandle::signed_in(user.clone());
    let (shelf_loop, handle, mut notices) = api.into_loop(user);
    let task = tokio::spawn(shelf_loop.run(session.subscribe()));

    handle.pickup(BookSelector::parse("Dune")).unwrap();
    handle.drop_on_book(BookSelector::parse("c1")).unwrap();

    let notice = notices.recv().await.unwrap();
    assert_eq!(notice.level, MessageLevel::Success);

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(
        snapshot.counts,
        Some(ShelfCounts {
            to_read: 0,
            completed: 2
        })
    );

    session.sign_out().await.unwrap();
    let store = task.await.unwrap();
    assert!(store.is_empty());
}
