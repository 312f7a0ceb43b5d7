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


//! Database migrations
//!
//! Schema creation and versioned migrations for the library store.
//!
//! # Migration Strategy
//! Migrations are runtime SQL executed in ascending id order and tracked in
//! the `migrations` table. Each migration's statements and its bookkeeping
//! row commit inside a single transaction, so a crash mid-migration leaves
//! the schema at the previous version. Re-running is a no-op.
//!
//! The history is append-only: shipped migrations are never edited, new
//! schema changes get a new id.

use crate::error::Result;
use sqlx::{Executor, SqlitePool};
use tracing::info;

/// A single schema migration: a block of SQL applied atomically
struct Migration {
    id: i64,
    name: &'static str,
    sql: &'static str,
}

/// Migration 1: core catalog tables
///
/// Books, per-book reading position, notes, highlights and the key-value
/// settings table with its seeded defaults.
const INITIAL_SCHEMA: &str = r#"
-- Books table: one row per imported book
CREATE TABLE IF NOT EXISTS books (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    author TEXT NOT NULL DEFAULT 'Unknown',
    type TEXT NOT NULL CHECK (type IN ('pdf', 'epub', 'txt')),
    pages INTEGER,
    cover_path TEXT,
    file_path TEXT NOT NULL,
    imported_at TEXT NOT NULL,
    last_opened_at TEXT
);

-- Reading position: exactly one row per book
CREATE TABLE IF NOT EXISTS progress (
    book_id TEXT PRIMARY KEY,
    location TEXT NOT NULL,
    percentage REAL NOT NULL DEFAULT 0,
    timestamp TEXT NOT NULL,
    FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE CASCADE
);

-- Free-form notes attached to books
CREATE TABLE IF NOT EXISTS notes (
    id TEXT PRIMARY KEY,
    book_id TEXT NOT NULL,
    content TEXT NOT NULL,
    location TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE CASCADE
);

-- Text highlights, immutable once created
CREATE TABLE IF NOT EXISTS highlights (
    id TEXT PRIMARY KEY,
    book_id TEXT NOT NULL,
    text TEXT NOT NULL,
    location TEXT NOT NULL,
    color TEXT NOT NULL DEFAULT '#ffff00',
    created_at TEXT NOT NULL,
    FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE CASCADE
);

-- Application settings, values stored as JSON strings
CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_books_last_opened_at ON books(last_opened_at);
CREATE INDEX IF NOT EXISTS idx_books_imported_at ON books(imported_at);
CREATE INDEX IF NOT EXISTS idx_notes_book_id ON notes(book_id);
CREATE INDEX IF NOT EXISTS idx_highlights_book_id ON highlights(book_id);

-- Seed default settings
INSERT OR IGNORE INTO settings (key, value) VALUES ('theme', '"dark"');
INSERT OR IGNORE INTO settings (key, value) VALUES ('viewMode', '"grid"');
INSERT OR IGNORE INTO settings (key, value) VALUES ('fontSize', '16');
INSERT OR IGNORE INTO settings (key, value) VALUES ('readerTheme', '"light"');
"#;

/// Migration 2: reading session tracking for statistics
const ADD_READING_SESSIONS: &str = r#"
CREATE TABLE IF NOT EXISTS reading_sessions (
    id TEXT PRIMARY KEY,
    book_id TEXT NOT NULL,
    start_time TEXT NOT NULL,
    end_time TEXT,
    duration_minutes INTEGER NOT NULL DEFAULT 0,
    FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_reading_sessions_book_id ON reading_sessions(book_id);
CREATE INDEX IF NOT EXISTS idx_reading_sessions_start_time ON reading_sessions(start_time);
"#;

/// Migration 3: shelves and the denormalized book progress column
const ADD_SHELVES_SYSTEM: &str = r#"
ALTER TABLE books ADD COLUMN progress REAL NOT NULL DEFAULT 0;

CREATE TABLE IF NOT EXISTS shelves (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    color TEXT NOT NULL DEFAULT '#3b82f6',
    icon TEXT NOT NULL DEFAULT '📚',
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS book_shelf (
    id TEXT PRIMARY KEY,
    book_id TEXT NOT NULL,
    shelf_id TEXT NOT NULL,
    added_at TEXT NOT NULL,
    FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE CASCADE,
    FOREIGN KEY (shelf_id) REFERENCES shelves(id) ON DELETE CASCADE,
    UNIQUE (book_id, shelf_id)
);

CREATE INDEX IF NOT EXISTS idx_shelves_created_at ON shelves(created_at);
CREATE INDEX IF NOT EXISTS idx_book_shelf_book_id ON book_shelf(book_id);
CREATE INDEX IF NOT EXISTS idx_book_shelf_shelf_id ON book_shelf(shelf_id);
"#;

const MIGRATIONS: &[Migration] = &[
    Migration {
        id: 1,
        name: "initial_schema",
        sql: INITIAL_SCHEMA,
    },
    Migration {
        id: 2,
        name: "add_reading_sessions",
        sql: ADD_READING_SESSIONS,
    },
    Migration {
        id: 3,
        name: "add_shelves_system",
        sql: ADD_SHELVES_SYSTEM,
    },
];

/// Run all database migrations
///
/// Ensures the tracking table exists, then applies pending migrations in
/// ascending id order. Safe to call any number of times.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    create_migrations_table(pool).await?;

    for migration in MIGRATIONS {
        run_migration(pool, migration).await?;
    }

    Ok(())
}

/// Create migrations tracking table
async fn create_migrations_table(pool: &SqlitePool) -> Result<()> {
    pool.execute(
        r#"
        CREATE TABLE IF NOT EXISTS migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .await?;

    Ok(())
}

/// Apply a single migration if it hasn't been applied yet
///
/// The migration SQL and its bookkeeping row commit together; a failure
/// rolls both back.
async fn run_migration(pool: &SqlitePool, migration: &Migration) -> Result<()> {
    let applied: Option<i64> = sqlx::query_scalar("SELECT id FROM migrations WHERE id = ?")
        .bind(migration.id)
        .fetch_optional(pool)
        .await?;

    if applied.is_some() {
        return Ok(());
    }

    info!(id = migration.id, name = migration.name, "applying migration");

    let mut tx = pool.begin().await?;

    (&mut *tx).execute(migration.sql).await?;

    sqlx::query("INSERT INTO migrations (id, name) VALUES (?, ?)")
        .bind(migration.id)
        .bind(migration.name)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(())
}
