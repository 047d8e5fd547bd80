//! # CLI Layer
//!
//! This module is **one possible UI client** for the shelf. It is not the
//! application itself.
//!
//! The CLI layer is the **only** place in the codebase that:
//! - Knows about terminal I/O (stdout, stderr, stdin)
//! - Uses `std::process::exit`
//! - Handles argument parsing
//! - Formats output for human consumption
//!
//! ## Structure
//!
//! - [`setup`]: clap definitions
//! - [`commands`]: `run()`, context wiring, and one `handle_*` per subcommand
//! - [`print`]: output formatting
//! - [`interactive`]: line-driven drag session on top of the event loop

pub mod commands;
pub mod interactive;
pub mod print;
pub mod setup;

pub use commands::run;
