//! Line-driven drag session.
//!
//! Each input line is one gesture sent to the [`ShelfLoop`](bookshelf::event_loop::ShelfLoop).
//! Drops return immediately; the loop reports the outcome later on its notice
//! channel, which a separate task prints as it arrives. Several moves can
//! therefore be in flight at once.

use super::print::{print_messages, print_shelf};
use bookshelf::api::ShelfApi;
use bookshelf::backend::rest::RestBackend;
use bookshelf::drag::DropTarget;
use bookshelf::error::{Result, ShelfError};
use bookshelf::event_loop::ShelfHandle;
use bookshelf::index::BookSelector;
use bookshelf::model::BookStatus;
use bookshelf::session::{AuthSession, SessionHandle, User};
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

const HELP: &str = "\
pick <book>            lift a book (r1, c2, an id, or part of a title)
drop <column|book>     drop it on a column (to-read, completed) or on another book
drop                   drop it nowhere
cancel                 put it back
list                   show the shelf
logout                 sign out and leave
quit                   leave";

#[derive(Debug, Clone, PartialEq)]
enum Input {
    Pick(BookSelector),
    DropOn(DropTarget),
    DropOnBook(BookSelector),
    Cancel,
    List,
    Help,
    Logout,
    Quit,
}

fn parse_line(line: &str) -> std::result::Result<Option<Input>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, arg) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let input = match verb.to_ascii_lowercase().as_str() {
        "pick" | "p" => {
            if arg.is_empty() {
                return Err("pick needs a book".into());
            }
            Input::Pick(BookSelector::parse(arg))
        }
        "drop" | "d" => {
            if arg.is_empty() {
                Input::DropOn(DropTarget::Nowhere)
            } else if let Ok(status) = arg.parse::<BookStatus>() {
                Input::DropOn(DropTarget::column(status))
            } else {
                Input::DropOnBook(BookSelector::parse(arg))
            }
        }
        "cancel" | "esc" => Input::Cancel,
        "list" | "ls" => Input::List,
        "help" | "?" => Input::Help,
        "logout" => Input::Logout,
        "quit" | "q" | "exit" => Input::Quit,
        other => return Err(format!("Unknown command: {} (try `help`)", other)),
    };
    Ok(Some(input))
}

async fn show(handle: &ShelfHandle) -> Result<()> {
    let result = handle.snapshot().await?;
    print_shelf(&result.listed_books, result.counts);
    Ok(())
}

fn send(outcome: Result<()>) -> Result<()> {
    outcome.map_err(|_| ShelfError::Api("the shelf session has ended".into()))
}

/// Run the session until `quit`, end of input, or sign-out.
///
/// Returns `true` when the user signed out.
pub async fn run(api: ShelfApi<RestBackend>, session: &SessionHandle, user: User) -> Result<bool> {
    let (shelf_loop, handle, mut notices) = api.into_loop(user);
    let loop_task = tokio::spawn(shelf_loop.run(session.subscribe()));
    let printer = tokio::spawn(async move {
        while let Some(notice) = notices.recv().await {
            print_messages(std::slice::from_ref(&notice));
        }
    });

    println!("{}", HELP.dimmed());
    println!();
    show(&handle).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut signed_out = false;

    while let Some(line) = lines.next_line().await? {
        let input = match parse_line(&line) {
            Ok(Some(input)) => input,
            Ok(None) => continue,
            Err(msg) => {
                eprintln!("{}", msg.yellow());
                continue;
            }
        };

        match input {
            Input::Pick(selector) => send(handle.pickup(selector))?,
            Input::DropOn(target) => send(handle.drop_on(target))?,
            Input::DropOnBook(selector) => send(handle.drop_on_book(selector))?,
            Input::Cancel => send(handle.cancel())?,
            Input::List => show(&handle).await?,
            Input::Help => println!("{}", HELP.dimmed()),
            Input::Logout => {
                session.sign_out().await?;
                signed_out = true;
                break;
            }
            Input::Quit => break,
        }
    }

    // Already stopped if the session ended; a failed send is expected then.
    let _ = handle.shutdown();
    let store = loop_task
        .await
        .map_err(|e| ShelfError::Api(format!("shelf loop failed: {}", e)))?;
    let _ = printer.await;
    debug!(books = store.len(), "interactive session ended");

    if signed_out {
        println!("{}", "Signed out.".green());
    }
    Ok(signed_out)
}
