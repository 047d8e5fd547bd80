use bookshelf::model::BookStatus;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "shelf", bin_name = "shelf", version)]
#[command(about = "Your reading list in two columns: To Read and Completed", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,

        /// Password (falls back to $SHELF_PASSWORD)
        #[arg(long, env = "SHELF_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and forget the cached session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Show both columns
    #[command(alias = "ls")]
    List,

    /// Move a book to the other column
    #[command(alias = "mv")]
    Move {
        /// Book to move: an index (r1, c2), an id, or part of its title
        book: String,

        /// Destination column: to-read or completed
        #[arg(value_parser = parse_column)]
        column: BookStatus,
    },

    /// Show reading counts, optionally pushing them to your profile
    Stats {
        /// Push the recalculated counts to the backend
        #[arg(long)]
        sync: bool,
    },

    /// Show a profile (yours by default)
    Profile {
        /// User id to look up
        user_id: Option<String>,
    },

    /// Drag books around interactively (pick / drop / cancel / list / quit)
    #[command(alias = "i")]
    Interactive,

    /// Get or set configuration
    Config {
        /// Configuration key (backend-url, anon-key, timeout)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}

fn parse_column(s: &str) -> Result<BookStatus, String> {
    s.parse()
}
