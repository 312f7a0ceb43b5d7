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


//! Annotations - notes and highlights
//!
//! Notes are upserted through a single draft type: no id means create,
//! an id means rewrite content/location and bump `updated_at`. Highlights
//! are immutable; they are only created and deleted. Both cascade away
//! with their book.

use crate::error::Result;
use crate::storage::models::{Highlight, NewHighlight, Note, NoteDraft};
use crate::storage::Database;
use chrono::Utc;
use uuid::Uuid;

/// Default highlight color, matching the schema default
const DEFAULT_HIGHLIGHT_COLOR: &str = "#ffff00";

#[derive(Debug, Clone)]
pub struct AnnotationStore {
    db: Database,
}

impl AnnotationStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    // ===== Notes =====

    /// Create or update a note
    ///
    /// Returns `None` when the draft carries an id that matches no note.
    pub async fn save_note(&self, draft: &NoteDraft) -> Result<Option<Note>> {
        match &draft.id {
            Some(id) => {
                sqlx::query(
                    "UPDATE notes SET content = ?, location = ?, updated_at = ? WHERE id = ?",
                )
                .bind(&draft.content)
                .bind(&draft.location)
                .bind(Utc::now())
                .bind(id)
                .execute(self.db.pool())
                .await?;

                self.note(id).await
            }
            None => {
                let now = Utc::now();
                let note = Note {
                    id: Uuid::new_v4().to_string(),
                    book_id: draft.book_id.clone(),
                    content: draft.content.clone(),
                    location: draft.location.clone(),
                    created_at: now,
                    updated_at: now,
                };

                sqlx::query(
                    "INSERT INTO notes (id, book_id, content, location, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
                )
                .bind(&note.id)
                .bind(&note.book_id)
                .bind(&note.content)
                .bind(&note.location)
                .bind(note.created_at)
                .bind(note.updated_at)
                .execute(self.db.pool())
                .await?;

                Ok(Some(note))
            }
        }
    }

    async fn note(&self, note_id: &str) -> Result<Option<Note>> {
        let note = sqlx::query_as::<_, Note>("SELECT * FROM notes WHERE id = ?")
            .bind(note_id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(note)
    }

    /// List a book's notes, newest first
    pub async fn notes(&self, book_id: &str) -> Result<Vec<Note>> {
        let notes = sqlx::query_as::<_, Note>(
            "SELECT * FROM notes WHERE book_id = ? ORDER BY created_at DESC",
        )
        .bind(book_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(notes)
    }

    /// Delete a note; returns whether one existed
    pub async fn delete_note(&self, note_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ?")
            .bind(note_id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ===== Highlights =====

    /// Create a highlight
    pub async fn save_highlight(&self, new: &NewHighlight) -> Result<Highlight> {
        let highlight = Highlight {
            id: Uuid::new_v4().to_string(),
            book_id: new.book_id.clone(),
            text: new.text.clone(),
            location: new.location.clone(),
            color: new
                .color
                .clone()
                .unwrap_or_else(|| DEFAULT_HIGHLIGHT_COLOR.to_string()),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO highlights (id, book_id, text, location, color, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&highlight.id)
        .bind(&highlight.book_id)
        .bind(&highlight.text)
        .bind(&highlight.location)
        .bind(&highlight.color)
        .bind(highlight.created_at)
        .execute(self.db.pool())
        .await?;

        Ok(highlight)
    }

    /// List a book's highlights, newest first
    pub async fn highlights(&self, book_id: &str) -> Result<Vec<Highlight>> {
        let highlights = sqlx::query_as::<_, Highlight>(
            "SELECT * FROM highlights WHERE book_id = ? ORDER BY created_at DESC",
        )
        .bind(book_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(highlights)
    }

    /// Delete a highlight; returns whether one existed
    pub async fn delete_highlight(&self, highlight_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM highlights WHERE id = ?")
            .bind(highlight_id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::{Book, BookType};

    async fn store_with_book(book_id: &str) -> AnnotationStore {
        let db = Database::new_in_memory()
            .await
            .expect("Failed to create database");

        let book = Book {
            id: book_id.to_string(),
            title: "T".to_string(),
            author: "Unknown".to_string(),
            book_type: BookType::Epub,
            pages: None,
            cover_path: None,
            file_path: format!("/vault/{}/book.epub", book_id),
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

        AnnotationStore::new(db)
    }

    #[tokio::test]
    async fn test_note_create_update_delete() {
        let store = store_with_book("b1").await;

        let created = store
            .save_note(&NoteDraft {
                id: None,
                book_id: "b1".to_string(),
                content: "first thought".to_string(),
                location: Some("p4".to_string()),
            })
            .await
            .expect("save failed")
            .expect("note missing");
        assert_eq!(created.created_at, created.updated_at);

        let updated = store
            .save_note(&NoteDraft {
                id: Some(created.id.clone()),
                book_id: "b1".to_string(),
                content: "second thought".to_string(),
                location: None,
            })
            .await
            .expect("save failed")
            .expect("note missing");
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.content, "second thought");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);

        let notes = store.notes("b1").await.expect("listing failed");
        assert_eq!(notes.len(), 1);

        assert!(store.delete_note(&created.id).await.expect("delete failed"));
        assert!(!store.delete_note(&created.id).await.expect("delete failed"));
    }

    #[tokio::test]
    async fn test_note_update_with_unknown_id() {
        let store = store_with_book("b1").await;

        let result = store
            .save_note(&NoteDraft {
                id: Some("no-such-note".to_string()),
                book_id: "b1".to_string(),
                content: "x".to_string(),
                location: None,
            })
            .await
            .expect("save failed");

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_highlight_lifecycle() {
        let store = store_with_book("b1").await;

        let highlight = store
            .save_highlight(&NewHighlight {
                book_id: "b1".to_string(),
                text: "a memorable line".to_string(),
                location: "ch2".to_string(),
                color: None,
            })
            .await
            .expect("save failed");
        assert_eq!(highlight.color, "#ffff00");

        let colored = store
            .save_highlight(&NewHighlight {
                book_id: "b1".to_string(),
                text: "another".to_string(),
                location: "ch3".to_string(),
                color: Some("#ff0000".to_string()),
            })
            .await
            .expect("save failed");
        assert_eq!(colored.color, "#ff0000");

        let highlights = store.highlights("b1").await.expect("listing failed");
        assert_eq!(highlights.len(), 2);

        assert!(store
            .delete_highlight(&highlight.id)
            .await
            .expect("delete failed"));
        assert_eq!(store.highlights("b1").await.expect("listing failed").len(), 1);
    }

    #[tokio::test]
    async fn test_annotations_cascade_with_book() {
        let store = store_with_book("b1").await;

        store
            .save_note(&NoteDraft {
                id: None,
                book_id: "b1".to_string(),
                content: "n".to_string(),
                location: None,
            })
            .await
            .expect("save failed");
        store
            .save_highlight(&NewHighlight {
                book_id: "b1".to_string(),
                text: "h".to_string(),
                location: "l".to_string(),
                color: None,
            })
            .await
            .expect("save failed");

        sqlx::query("DELETE FROM books WHERE id = 'b1'")
            .execute(store.db.pool())
            .await
            .expect("delete failed");

        assert!(store.notes("b1").await.expect("listing failed").is_empty());
        assert!(store.highlights("b1").await.expect("listing failed").is_empty());
    }
}
