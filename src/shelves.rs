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


//! Shelf engine - user shelves and smart shelves
//!
//! User shelves are plain rows with a `book_shelf` junction table; membership
//! operations are idempotent. Smart shelves are not stored at all: they are a
//! closed set of predicates evaluated over the full book list on demand, with
//! fixed ids, names, icons and colors. An unknown smart-shelf id is an error
//! rather than an empty list, so typos don't masquerade as empty shelves.

use crate::error::{Result, ShelfError};
use crate::storage::models::{Book, Shelf, ShelfPatch, ShelfWithBookCount};
use crate::storage::Database;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

/// Books shown by the Recently Added smart shelf
const RECENT_LIMIT: usize = 20;

/// Page count above which a book counts as large
const LARGE_PAGE_THRESHOLD: i64 = 300;

/// The closed set of computed shelves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmartShelf {
    Recent,
    InProgress,
    Unread,
    Finished,
    Large,
}

impl SmartShelf {
    pub const ALL: [SmartShelf; 5] = [
        SmartShelf::Recent,
        SmartShelf::InProgress,
        SmartShelf::Unread,
        SmartShelf::Finished,
        SmartShelf::Large,
    ];

    /// Stable id used by the UI and persisted in view state
    pub fn id(&self) -> &'static str {
        match self {
            SmartShelf::Recent => "smart-recent",
            SmartShelf::InProgress => "smart-progress",
            SmartShelf::Unread => "smart-unread",
            SmartShelf::Finished => "smart-finished",
            SmartShelf::Large => "smart-large",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SmartShelf::Recent => "Recently Added",
            SmartShelf::InProgress => "In Progress",
            SmartShelf::Unread => "Unread",
            SmartShelf::Finished => "Finished",
            SmartShelf::Large => "Large Files",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            SmartShelf::Recent => "🕐",
            SmartShelf::InProgress => "📖",
            SmartShelf::Unread => "📚",
            SmartShelf::Finished => "✅",
            SmartShelf::Large => "📦",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            SmartShelf::Recent => "#10b981",
            SmartShelf::InProgress => "#f59e0b",
            SmartShelf::Unread => "#6366f1",
            SmartShelf::Finished => "#22c55e",
            SmartShelf::Large => "#8b5cf6",
        }
    }

    /// Resolve a smart-shelf id; the set is closed
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.id() == id)
    }

    /// Evaluate this shelf's predicate over the full book set
    ///
    /// Progress buckets partition on the [0, 1] fraction: exactly 0 is
    /// unread, anything in between is in progress, 1 or more is finished.
    pub fn evaluate(&self, mut books: Vec<Book>) -> Vec<Book> {
        match self {
            SmartShelf::Recent => {
                books.sort_by(|a, b| b.imported_at.cmp(&a.imported_at));
                books.truncate(RECENT_LIMIT);
                books
            }
            SmartShelf::InProgress => {
                books.retain(|b| b.progress > 0.0 && b.progress < 1.0);
                books
            }
            SmartShelf::Unread => {
                books.retain(|b| b.progress == 0.0);
                books
            }
            SmartShelf::Finished => {
                books.retain(|b| b.progress >= 1.0);
                books
            }
            SmartShelf::Large => {
                books.retain(|b| b.pages.map_or(false, |p| p > LARGE_PAGE_THRESHOLD));
                books
            }
        }
    }
}

/// Smart shelf as presented in the sidebar, with its current book count
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartShelfSummary {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub book_count: usize,
    pub is_smart: bool,
}

/// Shelf service over `shelves` and `book_shelf`
#[derive(Debug, Clone)]
pub struct ShelfEngine {
    db: Database,
}

impl ShelfEngine {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a user shelf; color and icon fall back to the schema defaults
    pub async fn create_shelf(
        &self,
        name: &str,
        color: Option<&str>,
        icon: Option<&str>,
    ) -> Result<Shelf> {
        let shelf = Shelf {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            color: color.unwrap_or("#3b82f6").to_string(),
            icon: icon.unwrap_or("📚").to_string(),
            created_at: Utc::now(),
        };

        sqlx::query("INSERT INTO shelves (id, name, color, icon, created_at) VALUES (?, ?, ?, ?, ?)")
            .bind(&shelf.id)
            .bind(&shelf.name)
            .bind(&shelf.color)
            .bind(&shelf.icon)
            .bind(shelf.created_at)
            .execute(self.db.pool())
            .await?;

        Ok(shelf)
    }

    /// Rename a shelf, leaving its color and icon alone
    pub async fn rename_shelf(&self, shelf_id: &str, name: &str) -> Result<Option<Shelf>> {
        self.update_shelf(
            shelf_id,
            &ShelfPatch {
                name: Some(name.to_string()),
                ..Default::default()
            },
        )
        .await
    }

    /// Apply a partial update to a shelf
    pub async fn update_shelf(&self, shelf_id: &str, patch: &ShelfPatch) -> Result<Option<Shelf>> {
        let mut sets: Vec<&str> = Vec::new();
        if patch.name.is_some() {
            sets.push("name = ?");
        }
        if patch.color.is_some() {
            sets.push("color = ?");
        }
        if patch.icon.is_some() {
            sets.push("icon = ?");
        }

        if !sets.is_empty() {
            let sql = format!("UPDATE shelves SET {} WHERE id = ?", sets.join(", "));
            let mut query = sqlx::query(&sql);
            if let Some(name) = &patch.name {
                query = query.bind(name);
            }
            if let Some(color) = &patch.color {
                query = query.bind(color);
            }
            if let Some(icon) = &patch.icon {
                query = query.bind(icon);
            }
            query.bind(shelf_id).execute(self.db.pool()).await?;
        }

        let shelf = sqlx::query_as::<_, Shelf>("SELECT * FROM shelves WHERE id = ?")
            .bind(shelf_id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(shelf)
    }

    /// Delete a user shelf
    ///
    /// Junction rows cascade away; member books are untouched.
    pub async fn delete_shelf(&self, shelf_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM shelves WHERE id = ?")
            .bind(shelf_id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List user shelves with their member counts, newest first
    pub async fn all_shelves(&self) -> Result<Vec<ShelfWithBookCount>> {
        let shelves = sqlx::query_as::<_, ShelfWithBookCount>(
            r#"
            SELECT s.id, s.name, s.color, s.icon, s.created_at, COUNT(bs.book_id) AS book_count
            FROM shelves s
            LEFT JOIN book_shelf bs ON bs.shelf_id = s.id
            GROUP BY s.id
            ORDER BY s.created_at DESC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(shelves)
    }

    /// List the books on a user shelf, most recently added first
    pub async fn books_in_shelf(&self, shelf_id: &str) -> Result<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT b.*
            FROM books b
            JOIN book_shelf bs ON bs.book_id = b.id
            WHERE bs.shelf_id = ?
            ORDER BY bs.added_at DESC
            "#,
        )
        .bind(shelf_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(books)
    }

    /// List the user shelves a book belongs to, by name
    pub async fn shelves_for_book(&self, book_id: &str) -> Result<Vec<Shelf>> {
        let shelves = sqlx::query_as::<_, Shelf>(
            r#"
            SELECT s.*
            FROM shelves s
            JOIN book_shelf bs ON bs.shelf_id = s.id
            WHERE bs.book_id = ?
            ORDER BY s.name ASC
            "#,
        )
        .bind(book_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(shelves)
    }

    /// Put a book on a shelf; repeating the call is a no-op
    pub async fn add_book_to_shelf(&self, shelf_id: &str, book_id: &str) -> Result<()> {
        sqlx::query(
            "INSERT OR IGNORE INTO book_shelf (id, book_id, shelf_id, added_at) VALUES (?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(book_id)
        .bind(shelf_id)
        .bind(Utc::now())
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    /// Take a book off a shelf; removing an absent membership is a no-op
    pub async fn remove_book_from_shelf(&self, shelf_id: &str, book_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM book_shelf WHERE shelf_id = ? AND book_id = ?")
            .bind(shelf_id)
            .bind(book_id)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }

    /// Sidebar summaries for every smart shelf
    pub async fn smart_shelves(&self) -> Result<Vec<SmartShelfSummary>> {
        let books = self.all_books_by_imported().await?;

        let summaries = SmartShelf::ALL
            .iter()
            .map(|shelf| SmartShelfSummary {
                id: shelf.id(),
                name: shelf.name(),
                icon: shelf.icon(),
                color: shelf.color(),
                book_count: shelf.evaluate(books.clone()).len(),
                is_smart: true,
            })
            .collect();

        Ok(summaries)
    }

    /// Evaluate one smart shelf by id
    ///
    /// # Errors
    /// `ShelfNotFound` when the id is not in the closed smart-shelf set.
    pub async fn smart_shelf_books(&self, smart_id: &str) -> Result<Vec<Book>> {
        let shelf = SmartShelf::from_id(smart_id)
            .ok_or_else(|| ShelfError::ShelfNotFound(smart_id.to_string()))?;

        let books = self.all_books_by_imported().await?;
        Ok(shelf.evaluate(books))
    }

    async fn all_books_by_imported(&self) -> Result<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY imported_at DESC")
            .fetch_all(self.db.pool())
            .await?;

        Ok(books)
    }
}
