use bookshelf::api::{CmdMessage, MessageLevel, ProfileView};
use bookshelf::config::ShelfConfig;
use bookshelf::index::DisplayBook;
use bookshelf::model::{BookStatus, ShelfCounts};
use chrono::{DateTime, Utc};
use colored::Colorize;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 80;
const TIME_WIDTH: usize = 16;
const STICKY_MARKER: &str = "▌";

pub(crate) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        let line = if message.sticky {
            format!("{} {}", STICKY_MARKER, message.content)
        } else {
            message.content.clone()
        };
        match message.level {
            MessageLevel::Info => println!("{}", line.dimmed()),
            MessageLevel::Success => println!("{}", line.green()),
            MessageLevel::Warning => println!("{}", line.yellow()),
            MessageLevel::Error => eprintln!("{}", line.red()),
        }
    }
}

pub(crate) fn print_shelf(books: &[DisplayBook], counts: Option<ShelfCounts>) {
    for status in BookStatus::ALL {
        let column: Vec<_> = books.iter().filter(|db| db.index.status() == status).collect();
        let count = counts
            .map(|c| match status {
                BookStatus::ToRead => c.to_read,
                BookStatus::Completed => c.completed,
            })
            .unwrap_or(column.len());

        println!("{} {}", status.label().bold(), format!("({})", count).dimmed());
        if column.is_empty() {
            println!("    {}", "Nothing here yet.".dimmed());
        }
        for db in column {
            print_book_line(db);
        }
        println!();
    }
}

fn print_book_line(db: &DisplayBook) {
    let idx_str = format!("{}. ", db.index);
    let idx_width = idx_str.width();

    let time = db
        .book
        .completed_at
        .map(format_time_ago)
        .unwrap_or_else(|| " ".repeat(TIME_WIDTH));

    let mut text = format!("{} · {}", db.book.title, db.book.author);
    if let Some(genre) = &db.book.genre {
        text.push_str(&format!(" [{}]", genre));
    }

    let available = LINE_WIDTH.saturating_sub(4 + idx_width + TIME_WIDTH);
    let text = truncate_to_width(&text, available);
    let padding = available.saturating_sub(text.width());

    let idx_colored = match db.book.status {
        BookStatus::ToRead => idx_str.yellow(),
        BookStatus::Completed => idx_str.green(),
    };

    println!(
        "    {}{}{}{}",
        idx_colored,
        text,
        " ".repeat(padding),
        time.dimmed()
    );
}

pub(crate) fn print_counts(counts: &ShelfCounts) {
    println!("{:<12}{}", "To Read:", counts.to_read);
    println!("{:<12}{}", "Completed:", counts.completed);
    println!("{:<12}{}", "Total:", counts.total());
}

pub(crate) fn print_profile(view: &ProfileView) {
    let profile = &view.profile;
    println!("{}", profile.username.bold());
    if let Some(bio) = &profile.bio {
        println!("{}", bio);
    }
    println!(
        "{}",
        format!("Joined {}", profile.created_at.format("%Y-%m-%d")).dimmed()
    );

    if let Some(stats) = &view.stats {
        println!();
        println!("{:<12}{}", "To Read:", stats.total_books_to_read);
        println!("{:<12}{}", "Completed:", stats.total_books_read);
        println!("{:<12}{} days", "Streak:", stats.reading_streak);
        if let Some(genre) = &stats.favorite_genre {
            println!("{:<12}{}", "Favorite:", genre.bold());
        }
    }

    if view.is_own {
        println!();
        println!("{}", "Sign out with `shelf logout`.".dimmed());
    }
}

pub(crate) fn print_config(config: &ShelfConfig) {
    for key in ["backend-url", "anon-key", "timeout"] {
        println!("{} = {}", key, config.get(key).unwrap_or_default());
    }
}

/// Fit `s` into `max_width` columns, ending with "…" only when something was cut.
fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let budget = max_width.saturating_sub(1);
    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > budget {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
