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


//! Database connection and management
//!
//! This module handles database connection pooling, initialization, and
//! maintenance for the library store (`library.db` inside the library root).
//!
//! # SQLite Configuration
//! - WAL mode for better concurrency
//! - Foreign keys enabled (cascade deletes carry book lifecycle)
//! - Incremental auto-vacuum for space efficiency
//! - Normal synchronous mode (balance safety/speed)

use crate::error::{Result, ShelfError};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    ConnectOptions,
};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Database manager - handles connection pooling and schema migrations
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    path: Option<PathBuf>, // None for in-memory databases
}

impl Database {
    /// Create new database connection with migrations
    ///
    /// # Arguments
    /// * `database_path` - Path to SQLite database file (created if it doesn't exist)
    ///
    /// # Errors
    /// Returns error if:
    /// - Parent directory doesn't exist and can't be created
    /// - Database file can't be opened
    /// - Migrations fail
    pub async fn new<P: AsRef<Path>>(database_path: P) -> Result<Self> {
        let path = database_path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ShelfError::FileIoError(format!(
                        "Failed to create database directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let connection_string = format!("sqlite://{}?mode=rwc", path.display());
        let connect_opts = SqliteConnectOptions::from_str(&connection_string)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .foreign_keys(true)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30))
            .disable_statement_logging();

        // Migrations run on a dedicated connection that is closed before the
        // serving pool opens. Schema changes (ALTER TABLE) must never happen
        // underneath pooled connections: their prepared-statement metadata
        // goes stale and row decoding breaks.
        let migration_pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(connect_opts.clone())
            .await?;
        Self::configure_database(&migration_pool).await?;
        crate::storage::migrations::run_migrations(&migration_pool)
            .await
            .map_err(|e| ShelfError::MigrationFailed(e.to_string()))?;
        migration_pool.close().await;

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(connect_opts)
            .await?;

        Self::configure_database(&pool).await?;

        Ok(Self {
            pool,
            path: Some(path.to_path_buf()),
        })
    }

    /// Create in-memory database for testing
    ///
    /// # Errors
    /// Returns error if database creation or migration fails
    pub async fn new_in_memory() -> Result<Self> {
        let connect_opts = SqliteConnectOptions::from_str("sqlite::memory:")?
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .foreign_keys(true)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(1) // More than one connection would mean more than one database
            .connect_with(connect_opts)
            .await?;

        Self::configure_database(&pool).await?;

        let db = Self { pool, path: None };
        db.migrate().await?;

        Ok(db)
    }

    /// Configure database with pragmas not covered by the connect options
    async fn configure_database(pool: &SqlitePool) -> Result<()> {
        sqlx::query("PRAGMA auto_vacuum = INCREMENTAL")
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Run database migrations on this handle's own pool
    ///
    /// File-backed databases migrate on a separate connection inside
    /// [`Database::new`] before the pool exists; this entry point serves
    /// in-memory databases, where a second connection would be a second
    /// database. A failure here means the store must not be used.
    pub async fn migrate(&self) -> Result<()> {
        crate::storage::migrations::run_migrations(&self.pool)
            .await
            .map_err(|e| ShelfError::MigrationFailed(e.to_string()))?;

        Ok(())
    }

    /// Get reference to the connection pool
    ///
    /// Use this to execute queries directly on the pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get database file path
    ///
    /// Returns `None` for in-memory databases
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Close database and release all connections
    ///
    /// This will wait for all active connections to finish before closing.
    pub async fn close(self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }

    /// Check database integrity
    ///
    /// Runs SQLite integrity check and returns true if the database is okay.
    pub async fn check_integrity(&self) -> Result<bool> {
        let result: String = sqlx::query_scalar("PRAGMA integrity_check")
            .fetch_one(&self.pool)
            .await?;

        Ok(result == "ok")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new_in_memory()
            .await
            .expect("Failed to create in-memory database");

        let result: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(db.pool())
            .await
            .expect("Failed to query database");

        assert_eq!(result, 1);
        assert!(db.path().is_none());
    }

    #[tokio::test]
    async fn test_integrity_check() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let is_ok = db.check_integrity().await.expect("Failed to check integrity");

        assert!(is_ok, "Database integrity check failed");
    }

    #[tokio::test]
    async fn test_point_lookup_on_freshly_opened_file_database() {
        use crate::storage::models::Book;

        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db = Database::new(dir.path().join("library.db"))
            .await
            .expect("Failed to create database");

        sqlx::query(
            "INSERT INTO books (id, title, author, type, pages, cover_path, file_path, imported_at, last_opened_at, progress) VALUES ('b1', 'T', 'Unknown', 'txt', NULL, NULL, '/x/book.txt', ?, NULL, 0)",
        )
        .bind(chrono::Utc::now())
        .execute(db.pool())
        .await
        .expect("Failed to insert book");

        // The very first decode against the serving pool must see the
        // post-migration column set, including the ALTERed progress column
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = ?")
            .bind("b1")
            .fetch_optional(db.pool())
            .await
            .expect("Failed to query book");

        let book = book.expect("row must decode on a fresh pool");
        assert_eq!(book.id, "b1");
        assert_eq!(book.progress, 0.0);

        db.close().await.expect("Failed to close database");
    }

    #[tokio::test]
    async fn test_file_database_creates_parent_dirs() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = dir.path().join("nested").join("library.db");

        let db = Database::new(&db_path).await.expect("Failed to create database");

        assert_eq!(db.path(), Some(db_path.as_path()));
        assert!(db_path.exists());

        db.close().await.expect("Failed to close database");
    }
}
