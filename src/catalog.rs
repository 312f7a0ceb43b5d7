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


//! Book catalog - import pipeline and book CRUD
//!
//! The catalog owns the `books` table and drives imports end to end:
//! validate the extension, extract metadata (best effort), copy the file
//! into the vault, write sidecars, insert the row. Import failures never
//! escape [`BookCatalog::import_book`]; they come back as a structured
//! [`ImportResult`] so one bad file can't abort a batch.
//!
//! Deleting through the catalog removes the row only. Vault cleanup is a
//! separate phase owned by [`Library`](crate::library::Library).

use crate::error::{Result, ShelfError};
use crate::metadata::{self, BookMetadata, Extraction};
use crate::storage::models::{Book, BookPatch, BookType};
use crate::storage::Database;
use crate::vault::Vault;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

/// Per-file outcome of an import
///
/// Mirrors what the UI shows after a drag-and-drop: either the new catalog
/// row or a human-readable rejection reason.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub success: bool,
    pub book: Option<Book>,
    pub error: Option<String>,
}

impl ImportResult {
    fn imported(book: Book) -> Self {
        Self {
            success: true,
            book: Some(book),
            error: None,
        }
    }

    fn rejected(reason: String) -> Self {
        Self {
            success: false,
            book: None,
            error: Some(reason),
        }
    }
}

/// Catalog service over the `books` table and the vault
#[derive(Debug, Clone)]
pub struct BookCatalog {
    db: Database,
    vault: Vault,
}

impl BookCatalog {
    pub fn new(db: Database, vault: Vault) -> Self {
        Self { db, vault }
    }

    /// Import one file into the library
    ///
    /// Never returns an error: every failure mode (unsupported type, missing
    /// source, vault I/O, insert failure) is folded into the result.
    pub async fn import_book(&self, source: &Path) -> ImportResult {
        match self.try_import(source).await {
            Ok(book) => {
                info!(book_id = %book.id, title = %book.title, "imported book");
                ImportResult::imported(book)
            }
            Err(e) => {
                warn!(source = %source.display(), error = %e, "import failed");
                ImportResult::rejected(e.to_string())
            }
        }
    }

    /// Import a batch of files sequentially
    ///
    /// Results come back in input order, one per source file.
    pub async fn import_books(&self, sources: &[PathBuf]) -> Vec<ImportResult> {
        let mut results = Vec::with_capacity(sources.len());
        for source in sources {
            results.push(self.import_book(source).await);
        }
        results
    }

    async fn try_import(&self, source: &Path) -> Result<Book> {
        let extension = source
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        let book_type = BookType::from_extension(&extension).ok_or_else(|| {
            ShelfError::UnsupportedFormat(format!(
                "'{}' is not one of {}",
                extension,
                BookType::SUPPORTED_EXTENSIONS.join(", ")
            ))
        })?;

        let id = Uuid::new_v4().to_string();

        // Extraction is best effort; a failure only costs us the metadata
        let meta = match metadata::extract(source, book_type).await {
            Extraction::Extracted(meta) => meta,
            Extraction::Failed(reason) => {
                warn!(source = %source.display(), %reason, "metadata extraction failed, using defaults");
                BookMetadata::default()
            }
        };

        let fallback_title = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Untitled")
            .to_string();

        let file_path = self
            .vault
            .copy_book_in(source, &id, book_type.extension())
            .await?;

        let mut cover_path = None;
        if book_type == BookType::Epub {
            if let Some(bytes) = metadata::extract_epub_cover(source) {
                match self.vault.save_cover(&id, &bytes).await {
                    Ok(path) => cover_path = Some(path),
                    Err(e) => {
                        warn!(book_id = %id, error = %e, "cover write failed, importing without cover")
                    }
                }
            }
        }

        let book = Book {
            id: id.clone(),
            title: meta.title.unwrap_or(fallback_title),
            author: meta.author.unwrap_or_else(|| "Unknown".to_string()),
            book_type,
            pages: meta.pages,
            cover_path: cover_path.map(|p| p.display().to_string()),
            file_path: file_path.display().to_string(),
            imported_at: Utc::now(),
            last_opened_at: None,
            progress: 0.0,
        };

        self.vault.save_meta(&id, &book).await?;
        self.insert_book(&book).await?;

        Ok(book)
    }

    async fn insert_book(&self, book: &Book) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO books (id, title, author, type, pages, cover_path, file_path, imported_at, last_opened_at, progress)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
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
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    /// List all books, most recently opened first
    ///
    /// Never-opened books sort after opened ones, newest import first.
    pub async fn all_books(&self) -> Result<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books ORDER BY last_opened_at DESC NULLS LAST, imported_at DESC",
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(books)
    }

    /// Look up a single book
    pub async fn book(&self, book_id: &str) -> Result<Option<Book>> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = ?")
            .bind(book_id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(book)
    }

    /// Apply a partial update to a book's user-editable fields
    ///
    /// An empty patch is a no-op that returns the current row. Only catalog
    /// text changes; the vault file never moves.
    pub async fn update_book(&self, book_id: &str, patch: &BookPatch) -> Result<Option<Book>> {
        let mut sets: Vec<&str> = Vec::new();
        if patch.title.is_some() {
            sets.push("title = ?");
        }
        if patch.author.is_some() {
            sets.push("author = ?");
        }

        if sets.is_empty() {
            return self.book(book_id).await;
        }

        let sql = format!("UPDATE books SET {} WHERE id = ?", sets.join(", "));
        let mut query = sqlx::query(&sql);
        if let Some(title) = &patch.title {
            query = query.bind(title);
        }
        if let Some(author) = &patch.author {
            query = query.bind(author);
        }
        query.bind(book_id).execute(self.db.pool()).await?;

        self.book(book_id).await
    }

    /// Stamp a book's `last_opened_at` with the current time
    pub async fn touch_last_opened(&self, book_id: &str) -> Result<()> {
        sqlx::query("UPDATE books SET last_opened_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(book_id)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }

    /// Delete a book's catalog row
    ///
    /// Foreign keys cascade to progress, notes, highlights, sessions and
    /// shelf memberships. Returns whether a row was actually removed.
    /// The vault directory is not touched here.
    pub async fn delete_book(&self, book_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(book_id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn catalog() -> (TempDir, BookCatalog) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let db = Database::new_in_memory()
            .await
            .expect("Failed to create database");
        let vault = Vault::new(dir.path().join("books"));
        vault.initialize().await.expect("Failed to initialize vault");
        (dir, BookCatalog::new(db, vault))
    }

    async fn write_source(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        tokio::fs::write(&path, bytes)
            .await
            .expect("Failed to write source file");
        path
    }

    #[tokio::test]
    async fn test_import_pdf_round_trip() {
        let (dir, catalog) = catalog().await;
        let source = write_source(
            &dir,
            "sample.pdf",
            b"%PDF-1.4\n<< /Title (Sample) /Author (A. Writer) >>\n<< /Type /Page >>",
        )
        .await;

        let result = catalog.import_book(&source).await;
        assert!(result.success, "import failed: {:?}", result.error);

        let book = result.book.expect("missing book");
        assert_eq!(book.title, "Sample");
        assert_eq!(book.author, "A. Writer");
        assert_eq!(book.book_type, BookType::Pdf);
        assert_eq!(book.pages, Some(1));
        assert_eq!(book.progress, 0.0);
        assert!(book.last_opened_at.is_none());

        // Vault layout
        let vault_file = PathBuf::from(&book.file_path);
        assert!(vault_file.exists());
        assert!(vault_file.ends_with(format!("{}/book.pdf", book.id)));
        assert!(catalog.vault.meta_path(&book.id).exists());

        // Row round-trips
        let fetched = catalog
            .book(&book.id)
            .await
            .expect("lookup failed")
            .expect("book missing");
        assert_eq!(fetched.title, book.title);
        assert_eq!(fetched.imported_at, book.imported_at);
    }

    #[tokio::test]
    async fn test_import_unparseable_epub_falls_back_to_filename() {
        let (dir, catalog) = catalog().await;
        let source = write_source(&dir, "Broken Tome.epub", b"not actually a zip").await;

        let result = catalog.import_book(&source).await;
        assert!(result.success, "import failed: {:?}", result.error);

        let book = result.book.expect("missing book");
        assert_eq!(book.title, "Broken Tome");
        assert_eq!(book.author, "Unknown");
        assert_eq!(book.book_type, BookType::Epub);
        assert!(book.cover_path.is_none());
        assert!(book.pages.is_none());
    }

    #[tokio::test]
    async fn test_import_unsupported_type_leaves_nothing_behind() {
        let (dir, catalog) = catalog().await;
        let source = write_source(&dir, "book.mobi", b"mobi bytes").await;

        let result = catalog.import_book(&source).await;
        assert!(!result.success);
        assert!(result.book.is_none());
        assert!(result.error.unwrap().contains("mobi"));

        let books = catalog.all_books().await.expect("listing failed");
        assert!(books.is_empty());

        let ids = catalog.vault.book_ids().await.expect("vault listing failed");
        assert!(ids.is_empty(), "vault must stay empty on rejection");
    }

    #[tokio::test]
    async fn test_import_books_reports_per_file() {
        let (dir, catalog) = catalog().await;
        let good = write_source(&dir, "notes.txt", b"plain text").await;
        let bad = write_source(&dir, "movie.mkv", b"...").await;

        let results = catalog.import_books(&[good, bad]).await;
        assert_eq!(results.len(), 2);
        assert!(results[0].success);
        assert!(!results[1].success);
    }

    #[tokio::test]
    async fn test_all_books_ordering() {
        let (dir, catalog) = catalog().await;

        let a = write_source(&dir, "a.txt", b"a").await;
        let b = write_source(&dir, "b.txt", b"b").await;
        let c = write_source(&dir, "c.txt", b"c").await;

        let a = catalog.import_book(&a).await.book.unwrap();
        let b = catalog.import_book(&b).await.book.unwrap();
        let c = catalog.import_book(&c).await.book.unwrap();

        // Open b; it should lead, the never-opened rest follow newest-import-first
        catalog.touch_last_opened(&b.id).await.expect("touch failed");

        let books = catalog.all_books().await.expect("listing failed");
        let ids: Vec<&str> = books.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec![b.id.as_str(), c.id.as_str(), a.id.as_str()]);
    }

    #[tokio::test]
    async fn test_update_book_partial_and_empty_patch() {
        let (dir, catalog) = catalog().await;
        let source = write_source(&dir, "draft.txt", b"x").await;
        let book = catalog.import_book(&source).await.book.unwrap();

        let patch = BookPatch {
            title: Some("Final Title".to_string()),
            author: None,
        };
        let updated = catalog
            .update_book(&book.id, &patch)
            .await
            .expect("update failed")
            .expect("book missing");
        assert_eq!(updated.title, "Final Title");
        assert_eq!(updated.author, book.author);
        assert_eq!(updated.file_path, book.file_path, "file must not move");

        let unchanged = catalog
            .update_book(&book.id, &BookPatch::default())
            .await
            .expect("update failed")
            .expect("book missing");
        assert_eq!(unchanged.title, "Final Title");

        let missing = catalog
            .update_book("no-such-id", &patch)
            .await
            .expect("update failed");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_delete_book_removes_row_only() {
        let (dir, catalog) = catalog().await;
        let source = write_source(&dir, "gone.txt", b"x").await;
        let book = catalog.import_book(&source).await.book.unwrap();

        assert!(catalog.delete_book(&book.id).await.expect("delete failed"));
        assert!(catalog.book(&book.id).await.expect("lookup failed").is_none());

        // Catalog delete leaves the vault directory; cleanup is a separate phase
        assert!(catalog.vault.book_dir(&book.id).exists());

        // Second delete finds nothing
        assert!(!catalog.delete_book(&book.id).await.expect("delete failed"));
    }
}
