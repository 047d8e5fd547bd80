//! # Shelf CLI
//!
//! The binary is intentionally thin: the CLI lives in `cli/` and this file
//! only runs it and handles process termination. Everything behind
//! `bookshelf::api` is UI agnostic; the CLI owns argument parsing, logging
//! setup, rendering, and exit codes.
//!
//! Logging goes to stderr through `tracing`. `RUST_LOG` wins when set,
//! otherwise `--verbose` switches the crate from `warn` to `debug`.

mod cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
