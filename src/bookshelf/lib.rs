//! # Bookshelf Architecture
//!
//! Bookshelf is a **UI-agnostic reading-list library**: a user's books sit in
//! two columns, *To Read* and *Completed*, and move between them with a
//! drag-and-drop gesture. Books, profiles, and stats live in a hosted backend;
//! this crate keeps the session's copy of the shelf consistent with it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)  /  Event Loop (event_loop.rs)          │
//! │  - Owns the BookStore and the DragTracker                   │
//! │  - Normalizes inputs (r1 / c2 / titles → book ids)          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - load, list, move_book, stats, profile, config            │
//! │  - Returns CmdResult: data plus user-facing notifications   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Backend Layer (backend/)                                   │
//! │  - Async ShelfBackend trait                                 │
//! │  - RestBackend (production), InMemoryBackend (testing)      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Moves Are Persistence-First
//!
//! A drop never changes the local shelf by itself. The status write goes to
//! the backend first and the store is only updated once it succeeds, so a
//! failed move has nothing to roll back. Reading stats are recalculated after
//! each committed move and pushed on a best-effort basis. See
//! [`commands::move_book`].
//!
//! ## Explicit Identity
//!
//! There is no global "current user". The [`session`] module answers who is
//! signed in, and callers pass that [`session::User`] into every operation
//! that needs it.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`event_loop`]: Single-consumer loop for interactive drag sessions
//! - [`commands`]: Business logic for each operation
//! - [`store`]: The in-memory Book Record Store
//! - [`drag`]: Drag session state machine
//! - [`backend`]: Persistence collaborator trait and implementations
//! - [`session`]: Signed-in user and session change notifications
//! - [`model`]: Core data types (`BookRecord`, `BookStatus`, `ReadingStats`)
//! - [`index`]: Column-scoped display indexes (r1, c1)
//! - [`config`]: Configuration and cached session
//! - [`error`]: Error types

pub mod api;
pub mod backend;
pub mod commands;
pub mod config;
pub mod drag;
pub mod error;
pub mod event_loop;
pub mod index;
pub mod model;
pub mod session;
pub mod store;
