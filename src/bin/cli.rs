// ShelfSpace - Desktop E-book Library Manager
// Copyright (C) 2025 ShelfSpace contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Development CLI for poking at a ShelfSpace library from a terminal
//!
//! Not shipped with the desktop app; exists to exercise the engine without
//! the UI. Enable with `--features cli`.

use anyhow::Result;
use clap::{Parser, Subcommand};
use shelfspace::Library;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shelfspace-cli", about = "ShelfSpace library engine CLI")]
struct Cli {
    /// Library root directory (holds library.db and books/)
    #[arg(long, default_value = "./shelfspace-library")]
    library: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import one or more book files
    Import {
        /// Files to import (pdf, epub, txt)
        files: Vec<PathBuf>,
    },
    /// List all books
    List,
    /// List user shelves and smart shelves
    Shelves,
    /// Show the books on a smart shelf
    Smart {
        /// Smart shelf id, e.g. smart-recent
        id: String,
    },
    /// Delete a book (row and vault directory)
    Delete {
        /// Book id
        id: String,
    },
    /// Show overall reading statistics
    Stats,
    /// Remove vault directories without a catalog row
    Sweep,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let library = Library::open(&cli.library).await?;

    match cli.command {
        Command::Import { files } => {
            let results = library.catalog().import_books(&files).await;
            for (file, result) in files.iter().zip(&results) {
                if let Some(book) = &result.book {
                    println!("imported {} -> {} ({})", file.display(), book.title, book.id);
                } else {
                    println!(
                        "failed   {} -> {}",
                        file.display(),
                        result.error.as_deref().unwrap_or("unknown error")
                    );
                }
            }
        }
        Command::List => {
            for book in library.catalog().all_books().await? {
                println!(
                    "{}  [{}]  {} — {}  ({:.0}%)",
                    book.id,
                    book.book_type,
                    book.title,
                    book.author,
                    book.progress * 100.0
                );
            }
        }
        Command::Shelves => {
            for shelf in library.shelves().all_shelves().await? {
                println!("{}  {} {} ({} books)", shelf.id, shelf.icon, shelf.name, shelf.book_count);
            }
            for shelf in library.shelves().smart_shelves().await? {
                println!("{}  {} {} ({} books)", shelf.id, shelf.icon, shelf.name, shelf.book_count);
            }
        }
        Command::Smart { id } => {
            for book in library.shelves().smart_shelf_books(&id).await? {
                println!("{}  {}", book.id, book.title);
            }
        }
        Command::Delete { id } => {
            if library.delete_book(&id).await? {
                println!("deleted {}", id);
            } else {
                println!("no book with id {}", id);
            }
        }
        Command::Stats => {
            let stats = library.stats().overall_stats().await?;
            println!("total minutes:   {}", stats.total_minutes);
            println!("books read:      {}", stats.total_books);
            println!("avg session:     {} min", stats.average_session_minutes);
            println!("longest session: {} min", stats.longest_session_minutes);
            println!(
                "this week:       {} sessions, {} min",
                stats.sessions_this_week, stats.minutes_this_week
            );
        }
        Command::Sweep => {
            let removed = library.sweep_orphaned_vault_dirs().await?;
            println!("removed {} orphaned director{}", removed, if removed == 1 { "y" } else { "ies" });
        }
    }

    library.close().await?;

    Ok(())
}
