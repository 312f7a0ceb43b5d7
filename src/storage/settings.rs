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


//! Application settings store
//!
//! Settings are rows in the `settings` table, one JSON-serialized value per
//! key. Reads fold known keys over [`Settings::default`], so a fresh or
//! partially populated table always yields a complete settings object.
//! Unknown keys are left in the table untouched and ignored on read.

use crate::error::Result;
use crate::storage::database::Database;
use crate::storage::models::{Settings, SettingsPatch};

/// Typed access to the key-value settings table
#[derive(Debug, Clone)]
pub struct SettingsStore {
    db: Database,
}

impl SettingsStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Load the full settings object
    ///
    /// Malformed stored values fall back to the default for that key.
    pub async fn get(&self) -> Result<Settings> {
        let rows: Vec<(String, String)> = sqlx::query_as("SELECT key, value FROM settings")
            .fetch_all(self.db.pool())
            .await?;

        let mut settings = Settings::default();
        for (key, value) in rows {
            match key.as_str() {
                "theme" => {
                    if let Ok(v) = serde_json::from_str(&value) {
                        settings.theme = v;
                    }
                }
                "viewMode" => {
                    if let Ok(v) = serde_json::from_str(&value) {
                        settings.view_mode = v;
                    }
                }
                "fontSize" => {
                    if let Ok(v) = serde_json::from_str(&value) {
                        settings.font_size = v;
                    }
                }
                "readerTheme" => {
                    if let Ok(v) = serde_json::from_str(&value) {
                        settings.reader_theme = v;
                    }
                }
                _ => {} // unknown key, ignore
            }
        }

        Ok(settings)
    }

    /// Persist the provided keys and return the resulting settings
    ///
    /// Keys absent from the patch keep their stored values.
    pub async fn save(&self, patch: &SettingsPatch) -> Result<Settings> {
        let mut pairs: Vec<(&str, String)> = Vec::new();

        if let Some(theme) = &patch.theme {
            pairs.push(("theme", serde_json::to_string(theme)?));
        }
        if let Some(view_mode) = &patch.view_mode {
            pairs.push(("viewMode", serde_json::to_string(view_mode)?));
        }
        if let Some(font_size) = &patch.font_size {
            pairs.push(("fontSize", serde_json::to_string(font_size)?));
        }
        if let Some(reader_theme) = &patch.reader_theme {
            pairs.push(("readerTheme", serde_json::to_string(reader_theme)?));
        }

        for (key, value) in pairs {
            sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)")
                .bind(key)
                .bind(value)
                .execute(self.db.pool())
                .await?;
        }

        self.get().await
    }
}
