//! Database models for the ShelfSpace library engine
//!
//! # SQLite Adaptations
//! - Identifiers are opaque UUID strings (TEXT primary keys)
//! - DateTime stored as TEXT in ISO 8601 format
//! - The book type enum is stored as lowercase TEXT
//! - Settings values are stored as JSON strings
//! - Many-to-many shelf membership uses the `book_shelf` junction table

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============================================================================
// ENUMS
// ============================================================================

/// Supported document formats
///
/// The type is immutable after import and selects which document renderer
/// the UI invokes for the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum BookType {
    Pdf,
    Epub,
    Txt,
}

impl BookType {
    /// Map a lowercase file extension (without dot) to a book type
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "pdf" => Some(BookType::Pdf),
            "epub" => Some(BookType::Epub),
            "txt" => Some(BookType::Txt),
            _ => None,
        }
    }

    /// File extension used for the vault copy (`book.<ext>`)
    pub fn extension(&self) -> &'static str {
        match self {
            BookType::Pdf => "pdf",
            BookType::Epub => "epub",
            BookType::Txt => "txt",
        }
    }

    /// Extensions accepted by the importer
    pub const SUPPORTED_EXTENSIONS: [&'static str; 3] = ["pdf", "epub", "txt"];
}

impl std::fmt::Display for BookType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

// ============================================================================
// ENTITIES
// ============================================================================

/// Catalog entry for an imported book
///
/// `file_path` always points inside the vault (`books/<id>/book.<ext>`);
/// catalog renames never move files. `progress` is the denormalized reading
/// fraction in [0, 1], maintained by the progress store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub book_type: BookType,
    pub pages: Option<i64>,
    pub cover_path: Option<String>,
    pub file_path: String,
    pub imported_at: DateTime<Utc>,
    pub last_opened_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub progress: f64,
}

/// Reading position for a book, exactly one row per book
///
/// `location` is an opaque per-format string: page number for PDF, scroll
/// offset for TXT, canonical fragment identifier for EPUB.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReadingProgress {
    pub book_id: String,
    pub location: String,
    pub percentage: f64,
    pub timestamp: DateTime<Utc>,
}

/// Free-form note attached to a book
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub book_id: String,
    pub content: String,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Text highlight, immutable once created
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub id: String,
    pub book_id: String,
    pub text: String,
    pub location: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

/// User-created shelf
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Shelf {
    pub id: String,
    pub name: String,
    pub color: String,
    pub icon: String,
    pub created_at: DateTime<Utc>,
}

/// Shelf joined with its computed member count
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ShelfWithBookCount {
    pub id: String,
    pub name: String,
    pub color: String,
    pub icon: String,
    pub created_at: DateTime<Utc>,
    pub book_count: i64,
}

/// One reader-open/reader-close interval
///
/// `end_time` is null while the session is open; `duration_minutes` is 0
/// until the session closes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReadingSession {
    pub id: String,
    pub book_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_minutes: i64,
}

/// Per-book session aggregates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookReadingStats {
    pub book_id: String,
    pub total_minutes: i64,
    pub total_sessions: i64,
    pub last_read_at: Option<DateTime<Utc>>,
}

/// Library-wide session aggregates over all closed sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub total_minutes: i64,
    pub total_books: i64,
    pub average_session_minutes: i64,
    pub longest_session_minutes: i64,
    pub sessions_this_week: i64,
    pub minutes_this_week: i64,
    pub recent_sessions: Vec<ReadingSession>,
}

/// Application settings, persisted as per-key JSON values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub theme: String,
    pub view_mode: String,
    pub font_size: i64,
    pub reader_theme: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            view_mode: "grid".to_string(),
            font_size: 16,
            reader_theme: "light".to_string(),
        }
    }
}

// ============================================================================
// INPUT / PATCH TYPES
// ============================================================================

/// Partial update for a book; only provided fields are written
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
}

/// Note upsert payload; `id = None` creates, `id = Some` updates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteDraft {
    pub id: Option<String>,
    pub book_id: String,
    pub content: String,
    pub location: Option<String>,
}

/// New highlight payload; color falls back to the schema default yellow
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHighlight {
    pub book_id: String,
    pub text: String,
    pub location: String,
    pub color: Option<String>,
}

/// Partial update for a shelf
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShelfPatch {
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// Progress save payload; percentage is on the 0-100 scale
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub book_id: String,
    pub location: String,
    pub percentage: f64,
}

/// Partial settings update; only provided keys are written
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub theme: Option<String>,
    pub view_mode: Option<String>,
    pub font_size: Option<i64>,
    pub reader_theme: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn book_type_from_extension() {
        assert_eq!(BookType::from_extension("pdf"), Some(BookType::Pdf));
        assert_eq!(BookType::from_extension("epub"), Some(BookType::Epub));
        assert_eq!(BookType::from_extension("txt"), Some(BookType::Txt));
        assert_eq!(BookType::from_extension("mobi"), None);
        assert_eq!(BookType::from_extension(""), None);
    }

    #[test]
    fn book_serializes_with_camel_case_keys() {
        let book = Book {
            id: "b1".to_string(),
            title: "Title".to_string(),
            author: "Unknown".to_string(),
            book_type: BookType::Epub,
            pages: Some(12),
            cover_path: None,
            file_path: "/vault/b1/book.epub".to_string(),
            imported_at: Utc::now(),
            last_opened_at: None,
            progress: 0.0,
        };

        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["type"], "epub");
        assert!(json.get("filePath").is_some());
        assert!(json.get("importedAt").is_some());
    }

    #[test]
    fn default_settings_match_seeded_values() {
        let settings = Settings::default();
        assert_eq!(settings.theme, "dark");
        assert_eq!(settings.view_mode, "grid");
        assert_eq!(settings.font_size, 16);
        assert_eq!(settings.reader_theme, "light");
    }
}
