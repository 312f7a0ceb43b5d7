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


//! Storage module - SQLite database layer
//!
//! Connection handling, schema migrations, entity models and the settings
//! store. Domain services (catalog, shelves, progress, annotations, stats)
//! live at the crate root and run their queries through [`Database`].

pub mod database;
pub mod migrations;
pub mod models;
pub mod settings;

pub use database::Database;
pub use models::{
    Book, BookPatch, BookReadingStats, BookType, Highlight, NewHighlight, Note,
    NoteDraft, OverallStats, ProgressUpdate, ReadingProgress, ReadingSession, Settings,
    SettingsPatch, Shelf, ShelfPatch, ShelfWithBookCount,
};
pub use settings::SettingsStore;
