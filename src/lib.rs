//! ShelfSpace core - local library engine for a desktop e-book manager
//!
//! This crate owns everything below the UI: the SQLite catalog
//! (`library.db`), the on-disk book vault, shelves and smart shelves,
//! reading progress, notes and highlights, reading statistics and
//! application settings.
//!
//! # Usage
//!
//! ```no_run
//! use shelfspace::Library;
//!
//! # async fn run() -> shelfspace::Result<()> {
//! let library = Library::open("/home/user/.local/share/shelfspace").await?;
//!
//! let result = library.catalog().import_book("/tmp/some-book.epub".as_ref()).await;
//! if let Some(book) = result.book {
//!     println!("imported {}", book.title);
//! }
//!
//! library.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod annotations;
pub mod catalog;
pub mod error;
pub mod library;
pub mod metadata;
pub mod progress;
pub mod shelves;
pub mod stats;
pub mod storage;
pub mod vault;

pub use annotations::AnnotationStore;
pub use catalog::{BookCatalog, ImportResult};
pub use error::{Result, ShelfError};
pub use library::Library;
pub use metadata::{BookMetadata, Extraction};
pub use progress::ProgressStore;
pub use shelves::{ShelfEngine, SmartShelf, SmartShelfSummary};
pub use stats::StatsStore;
pub use storage::{
    Book, BookPatch, BookReadingStats, BookType, Database, Highlight, NewHighlight, Note,
    NoteDraft, OverallStats, ProgressUpdate, ReadingProgress, ReadingSession, Settings,
    SettingsPatch, SettingsStore, Shelf, ShelfPatch, ShelfWithBookCount,
};
pub use vault::Vault;
