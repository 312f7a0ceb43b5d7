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


//! Reading-progress store
//!
//! One position row per book, overwritten on every save. A save also
//! maintains the denormalized columns on `books`: the progress fraction
//! (smart shelves bucket on it) and `last_opened_at` (the library list
//! sorts by it), so saving progress counts as opening the book.

use crate::error::Result;
use crate::storage::models::{ProgressUpdate, ReadingProgress};
use crate::storage::Database;
use chrono::Utc;

#[derive(Debug, Clone)]
pub struct ProgressStore {
    db: Database,
}

impl ProgressStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Save the reading position for a book, replacing any previous one
    ///
    /// `percentage` comes in on the reader's 0-100 scale; the denormalized
    /// book fraction is `percentage / 100` clamped to [0, 1].
    pub async fn save(&self, update: &ProgressUpdate) -> Result<ReadingProgress> {
        let now = Utc::now();

        sqlx::query(
            "INSERT OR REPLACE INTO progress (book_id, location, percentage, timestamp) VALUES (?, ?, ?, ?)",
        )
        .bind(&update.book_id)
        .bind(&update.location)
        .bind(update.percentage)
        .bind(now)
        .execute(self.db.pool())
        .await?;

        let fraction = (update.percentage / 100.0).clamp(0.0, 1.0);
        sqlx::query("UPDATE books SET progress = ?, last_opened_at = ? WHERE id = ?")
            .bind(fraction)
            .bind(now)
            .bind(&update.book_id)
            .execute(self.db.pool())
            .await?;

        Ok(ReadingProgress {
            book_id: update.book_id.clone(),
            location: update.location.clone(),
            percentage: update.percentage,
            timestamp: now,
        })
    }

    /// Current reading position for a book, if one was ever saved
    pub async fn get(&self, book_id: &str) -> Result<Option<ReadingProgress>> {
        let progress =
            sqlx::query_as::<_, ReadingProgress>("SELECT * FROM progress WHERE book_id = ?")
                .bind(book_id)
                .fetch_optional(self.db.pool())
                .await?;

        Ok(progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::{Book, BookType};

    async fn store_with_book(book_id: &str) -> ProgressStore {
        let db = Database::new_in_memory()
            .await
            .expect("Failed to create database");

        let book = Book {
            id: book_id.to_string(),
            title: "T".to_string(),
            author: "Unknown".to_string(),
            book_type: BookType::Pdf,
            pages: Some(100),
            cover_path: None,
            file_path: format!("/vault/{}/book.pdf", book_id),
            imported_at: Utc::now(),
            last_opened_at: None,
            progress: 0.0,
        };
        sqlx::query(
            "INSERT INTO books (id, title, author, type, pages, cover_path, file_path, imported_at, last_opened_at, progress) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.book_type)
        .bind(book.pages)
        .bind(&book.cover_path)
        .bind(&book.file_path)
        .bind(book.imported_at)
        .bind(book.last_opened_at)
        .bind(book.progress)
        .execute(db.pool())
        .await
        .expect("Failed to insert book");

        ProgressStore::new(db)
    }

    #[tokio::test]
    async fn test_save_overwrites_and_denormalizes() {
        let store = store_with_book("b1").await;

        let first = ProgressUpdate {
            book_id: "b1".to_string(),
            location: "12".to_string(),
            percentage: 30.0,
        };
        store.save(&first).await.expect("save failed");

        let second = ProgressUpdate {
            book_id: "b1".to_string(),
            location: "30".to_string(),
            percentage: 60.0,
        };
        store.save(&second).await.expect("save failed");

        // Single row, latest position
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM progress")
            .fetch_one(store.db.pool())
            .await
            .expect("count failed");
        assert_eq!(count, 1);

        let progress = store
            .get("b1")
            .await
            .expect("get failed")
            .expect("progress missing");
        assert_eq!(progress.location, "30");
        assert_eq!(progress.percentage, 60.0);

        // Denormalized fraction and last_opened touch
        let (fraction, last_opened): (f64, Option<String>) =
            sqlx::query_as("SELECT progress, last_opened_at FROM books WHERE id = 'b1'")
                .fetch_one(store.db.pool())
                .await
                .expect("book lookup failed");
        assert!((fraction - 0.60).abs() < f64::EPSILON);
        assert!(last_opened.is_some());
    }

    #[tokio::test]
    async fn test_fraction_is_clamped() {
        let store = store_with_book("b1").await;

        store
            .save(&ProgressUpdate {
                book_id: "b1".to_string(),
                location: "end".to_string(),
                percentage: 150.0,
            })
            .await
            .expect("save failed");

        let fraction: f64 = sqlx::query_scalar("SELECT progress FROM books WHERE id = 'b1'")
            .fetch_one(store.db.pool())
            .await
            .expect("lookup failed");
        assert_eq!(fraction, 1.0);
    }

    #[tokio::test]
    async fn test_get_without_saved_position() {
        let store = store_with_book("b1").await;
        assert!(store.get("b1").await.expect("get failed").is_none());
    }
}
