//! Error types for the ShelfSpace library engine
//!
//! Errors are categorized by domain (storage, vault, catalog) using thiserror.
//! The split mirrors the failure taxonomy of the application:
//!
//! - **Fatal (startup)**: migration failures and store/vault-root errors abort
//!   `Library::open`.
//! - **Recoverable/reported**: import failures are captured in
//!   [`ImportResult`](crate::catalog::ImportResult), never propagated out of
//!   the import boundary.
//! - **Best-effort/swallowed**: metadata and cover extraction errors are
//!   logged and replaced with defaults.
//! - **Not-found**: point lookups return `Option`; the only exception is the
//!   closed smart-shelf id set, where an unknown id is `ShelfNotFound`.

use thiserror::Error;

/// Result type alias using our ShelfError type
pub type Result<T> = std::result::Result<T, ShelfError>;

/// Main error type for the ShelfSpace core
#[derive(Error, Debug)]
pub enum ShelfError {
    // ===== Storage =====
    /// Database schema migration failed; the store must not be used
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    // ===== Vault / file errors =====
    /// File or directory not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Generic file I/O error
    #[error("File I/O error: {0}")]
    FileIoError(String),

    // ===== Catalog / shelves =====
    /// File extension outside the supported set (pdf, epub, txt)
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    /// Unknown smart-shelf id (the smart-shelf set is closed)
    #[error("Smart shelf not found: {0}")]
    ShelfNotFound(String),

    /// Generic input validation error
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ===== External library errors =====
    /// Database driver error from sqlx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
