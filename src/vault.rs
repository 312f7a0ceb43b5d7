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


//! Book vault - canonical on-disk storage for imported books
//!
//! Every imported book owns one directory under the vault root, keyed by its
//! catalog id:
//!
//! ```text
//! <root>/<bookId>/
//!     book.<ext>    the imported file (pdf/epub/txt)
//!     cover.png     extracted cover image, if any
//!     meta.json     JSON sidecar of the catalog row at import time
//! ```
//!
//! The vault never touches the database; pairing vault directories with
//! catalog rows is the caller's job. All failures surface immediately as
//! errors, except [`Vault::delete_book`] which tolerates a missing directory.

use crate::error::{Result, ShelfError};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Name of the cover sidecar, fixed regardless of the source image format
const COVER_FILE: &str = "cover.png";

/// Name of the metadata sidecar
const META_FILE: &str = "meta.json";

/// Filesystem vault rooted at `<library root>/books`
#[derive(Debug, Clone)]
pub struct Vault {
    root: PathBuf,
}

impl Vault {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Vault root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory owned by a book
    pub fn book_dir(&self, book_id: &str) -> PathBuf {
        self.root.join(book_id)
    }

    /// Path of the imported file inside a book's directory
    pub fn book_file_path(&self, book_id: &str, extension: &str) -> PathBuf {
        self.book_dir(book_id).join(format!("book.{}", extension))
    }

    /// Path of the cover sidecar inside a book's directory
    pub fn cover_path(&self, book_id: &str) -> PathBuf {
        self.book_dir(book_id).join(COVER_FILE)
    }

    /// Path of the metadata sidecar inside a book's directory
    pub fn meta_path(&self, book_id: &str) -> PathBuf {
        self.book_dir(book_id).join(META_FILE)
    }

    /// Create the vault root if it doesn't exist
    ///
    /// Idempotent; called once during library startup.
    pub async fn initialize(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await.map_err(|e| {
            ShelfError::FileIoError(format!(
                "Failed to create vault root {}: {}",
                self.root.display(),
                e
            ))
        })?;

        Ok(())
    }

    /// Copy a source file into the vault as `<bookId>/book.<ext>`
    ///
    /// Creates the book directory, copies the bytes and returns the
    /// destination path. The source file is left in place.
    ///
    /// # Errors
    /// Returns `FileNotFound` if the source doesn't exist, `FileIoError` on
    /// any copy failure.
    pub async fn copy_book_in(
        &self,
        source: &Path,
        book_id: &str,
        extension: &str,
    ) -> Result<PathBuf> {
        if !fs::try_exists(source).await.unwrap_or(false) {
            return Err(ShelfError::FileNotFound(source.display().to_string()));
        }

        let dir = self.book_dir(book_id);
        fs::create_dir_all(&dir).await.map_err(|e| {
            ShelfError::FileIoError(format!(
                "Failed to create book directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        let destination = self.book_file_path(book_id, extension);
        fs::copy(source, &destination).await.map_err(|e| {
            ShelfError::FileIoError(format!(
                "Failed to copy {} into vault: {}",
                source.display(),
                e
            ))
        })?;

        debug!(book_id, destination = %destination.display(), "copied book into vault");

        Ok(destination)
    }

    /// Write cover bytes to the book's `cover.png` sidecar
    ///
    /// The bytes are written verbatim; no image conversion happens here.
    pub async fn save_cover(&self, book_id: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.cover_path(book_id);
        fs::write(&path, bytes).await.map_err(|e| {
            ShelfError::FileIoError(format!("Failed to write cover {}: {}", path.display(), e))
        })?;

        Ok(path)
    }

    /// Write the `meta.json` sidecar for a book
    pub async fn save_meta<T: Serialize>(&self, book_id: &str, meta: &T) -> Result<()> {
        let path = self.meta_path(book_id);
        let json = serde_json::to_string_pretty(meta)?;
        fs::write(&path, json).await.map_err(|e| {
            ShelfError::FileIoError(format!(
                "Failed to write metadata {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(())
    }

    /// Remove a book's directory and everything in it
    ///
    /// A missing directory is not an error: delete is used for cleanup after
    /// catalog removal and must be safe to repeat.
    pub async fn delete_book(&self, book_id: &str) -> Result<()> {
        let dir = self.book_dir(book_id);

        match fs::remove_dir_all(&dir).await {
            Ok(()) => {
                debug!(book_id, "removed book directory from vault");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ShelfError::FileIoError(format!(
                "Failed to remove book directory {}: {}",
                dir.display(),
                e
            ))),
        }
    }

    /// List the book ids currently present in the vault
    ///
    /// Ids are directory names under the root; stray files are skipped.
    pub async fn book_ids(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();

        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ids),
            Err(e) => {
                return Err(ShelfError::FileIoError(format!(
                    "Failed to read vault root {}: {}",
                    self.root.display(),
                    e
                )))
            }
        };

        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            ShelfError::FileIoError(format!("Failed to read vault entry: {}", e))
        })? {
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            if is_dir {
                if let Some(name) = entry.file_name().to_str() {
                    ids.push(name.to_string());
                }
            }
        }

        Ok(ids)
    }
}
