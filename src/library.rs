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


//! Library facade - lifecycle and cross-cutting operations
//!
//! [`Library::open`] is the single entry point: it creates and migrates
//! `<root>/library.db`, initializes the `<root>/books/` vault and wires
//! every service onto shared handles. Any failure here is fatal; a library
//! whose schema didn't migrate must not be used.
//!
//! Operations that span the catalog and the vault live here, most notably
//! book deletion, which runs in two phases: the catalog row goes first
//! (cascading to all dependents), then the vault directory. The phases are
//! not atomic. A vault failure after a successful row delete leaves an
//! orphaned directory; that is logged and accepted, and
//! [`Library::sweep_orphaned_vault_dirs`] reclaims such directories on
//! demand.

use crate::annotations::AnnotationStore;
use crate::catalog::BookCatalog;
use crate::error::Result;
use crate::progress::ProgressStore;
use crate::shelves::ShelfEngine;
use crate::stats::StatsStore;
use crate::storage::{Database, SettingsStore};
use crate::vault::Vault;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Name of the SQLite file inside the library root
const DATABASE_FILE: &str = "library.db";

/// Name of the vault directory inside the library root
const VAULT_DIR: &str = "books";

/// An open ShelfSpace library rooted at a directory on disk
#[derive(Debug, Clone)]
pub struct Library {
    db: Database,
    vault: Vault,
    catalog: BookCatalog,
    shelves: ShelfEngine,
    progress: ProgressStore,
    annotations: AnnotationStore,
    stats: StatsStore,
    settings: SettingsStore,
}

impl Library {
    /// Open (or create) the library under `root`
    ///
    /// # Errors
    /// Fails if the database can't be opened or migrated, or the vault root
    /// can't be created. On error nothing is usable and the caller should
    /// surface it as a startup failure.
    pub async fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();

        let db = Database::new(root.join(DATABASE_FILE)).await?;

        let vault = Vault::new(root.join(VAULT_DIR));
        vault.initialize().await?;

        let library = Self {
            catalog: BookCatalog::new(db.clone(), vault.clone()),
            shelves: ShelfEngine::new(db.clone()),
            progress: ProgressStore::new(db.clone()),
            annotations: AnnotationStore::new(db.clone()),
            stats: StatsStore::new(db.clone()),
            settings: SettingsStore::new(db.clone()),
            db,
            vault,
        };

        info!(root = %root.display(), "library opened");

        Ok(library)
    }

    /// Close the library, releasing the database pool
    pub async fn close(self) -> Result<()> {
        self.db.close().await
    }

    // ===== Service accessors =====

    pub fn catalog(&self) -> &BookCatalog {
        &self.catalog
    }

    pub fn shelves(&self) -> &ShelfEngine {
        &self.shelves
    }

    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    pub fn annotations(&self) -> &AnnotationStore {
        &self.annotations
    }

    pub fn stats(&self) -> &StatsStore {
        &self.stats
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn vault(&self) -> &Vault {
        &self.vault
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    // ===== Cross-cutting operations =====

    /// Delete a book: catalog row first, then its vault directory
    ///
    /// The row delete cascades to progress, notes, highlights, sessions and
    /// shelf memberships. Vault cleanup is best effort; a failure there is
    /// logged and the delete still reports success, leaving an orphaned
    /// directory for a later sweep.
    pub async fn delete_book(&self, book_id: &str) -> Result<bool> {
        let deleted = self.catalog.delete_book(book_id).await?;

        if deleted {
            if let Err(e) = self.vault.delete_book(book_id).await {
                warn!(book_id, error = %e, "vault cleanup failed, directory orphaned");
            }
        }

        Ok(deleted)
    }

    /// Vault path of a book's imported file
    ///
    /// Returns `None` for an unknown book id.
    pub async fn file_path(&self, book_id: &str) -> Result<Option<PathBuf>> {
        let book = self.catalog.book(book_id).await?;
        Ok(book.map(|b| PathBuf::from(b.file_path)))
    }

    /// Read a book's imported file out of the vault
    ///
    /// Returns `None` when the book is unknown or its vault file is gone
    /// (the catalog row outliving the file is the mirror image of the
    /// orphan gap and gets the same tolerant treatment).
    pub async fn read_file_bytes(&self, book_id: &str) -> Result<Option<Vec<u8>>> {
        let Some(path) = self.file_path(book_id).await? else {
            return Ok(None);
        };

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(book_id, path = %path.display(), "vault file missing for catalog row");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Remove vault directories that have no catalog row
    ///
    /// Reconciliation pass for directories orphaned by interrupted deletes.
    /// Not run automatically; callers decide when (typically at startup).
    /// Returns how many directories were removed.
    pub async fn sweep_orphaned_vault_dirs(&self) -> Result<usize> {
        let mut removed = 0;

        for vault_id in self.vault.book_ids().await? {
            if self.catalog.book(&vault_id).await?.is_none() {
                info!(book_id = %vault_id, "sweeping orphaned vault directory");
                self.vault.delete_book(&vault_id).await?;
                removed += 1;
            }
        }

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn library() -> (TempDir, Library) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let library = Library::open(dir.path()).await.expect("Failed to open library");
        (dir, library)
    }

    async fn import_txt(dir: &TempDir, library: &Library, name: &str) -> crate::storage::models::Book {
        let source = dir.path().join(name);
        tokio::fs::write(&source, b"contents")
            .await
            .expect("Failed to write source");
        let result = library.catalog().import_book(&source).await;
        result.book.expect("import failed")
    }

    #[tokio::test]
    async fn test_open_creates_layout() {
        let (dir, library) = library().await;

        assert!(dir.path().join("library.db").exists());
        assert!(dir.path().join("books").is_dir());

        library.close().await.expect("close failed");
    }

    #[tokio::test]
    async fn test_reopen_existing_library() {
        let dir = TempDir::new().expect("Failed to create temp dir");

        let library = Library::open(dir.path()).await.expect("first open failed");
        let book = import_txt(&dir, &library, "keep.txt").await;
        library.close().await.expect("close failed");

        let library = Library::open(dir.path()).await.expect("second open failed");
        let books = library.catalog().all_books().await.expect("listing failed");
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].id, book.id);
    }

    #[tokio::test]
    async fn test_delete_book_removes_row_and_vault_dir() {
        let (dir, library) = library().await;
        let book = import_txt(&dir, &library, "gone.txt").await;

        assert!(library.vault().book_dir(&book.id).exists());
        assert!(library.delete_book(&book.id).await.expect("delete failed"));

        assert!(library
            .catalog()
            .book(&book.id)
            .await
            .expect("lookup failed")
            .is_none());
        assert!(!library.vault().book_dir(&book.id).exists());

        // Unknown id reports false
        assert!(!library.delete_book(&book.id).await.expect("delete failed"));
    }

    #[tokio::test]
    async fn test_file_access() {
        let (dir, library) = library().await;
        let book = import_txt(&dir, &library, "read-me.txt").await;

        let path = library
            .file_path(&book.id)
            .await
            .expect("path lookup failed")
            .expect("path missing");
        assert!(path.ends_with(format!("{}/book.txt", book.id)));

        let bytes = library
            .read_file_bytes(&book.id)
            .await
            .expect("read failed")
            .expect("bytes missing");
        assert_eq!(bytes, b"contents");

        assert!(library
            .read_file_bytes("no-such-book")
            .await
            .expect("read failed")
            .is_none());
    }

    #[tokio::test]
    async fn test_read_file_bytes_with_missing_vault_file() {
        let (dir, library) = library().await;
        let book = import_txt(&dir, &library, "vanish.txt").await;

        tokio::fs::remove_file(library.vault().book_file_path(&book.id, "txt"))
            .await
            .expect("Failed to remove vault file");

        let bytes = library
            .read_file_bytes(&book.id)
            .await
            .expect("read failed");
        assert!(bytes.is_none());
    }

    #[tokio::test]
    async fn test_sweep_orphaned_vault_dirs() {
        let (dir, library) = library().await;
        let kept = import_txt(&dir, &library, "kept.txt").await;

        // Fabricate an orphan: a vault dir with no catalog row
        let orphan_dir = library.vault().book_dir("orphan-id");
        tokio::fs::create_dir_all(&orphan_dir)
            .await
            .expect("Failed to create orphan dir");
        tokio::fs::write(orphan_dir.join("book.txt"), b"x")
            .await
            .expect("Failed to write orphan file");

        let removed = library
            .sweep_orphaned_vault_dirs()
            .await
            .expect("sweep failed");

        assert_eq!(removed, 1);
        assert!(!orphan_dir.exists());
        assert!(library.vault().book_dir(&kept.id).exists());
    }
}
