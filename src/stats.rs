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


//! Reading sessions and aggregate statistics
//!
//! A session opens when the reader opens a book and closes when it closes;
//! duration is whole minutes, rounded. Aggregates only ever count closed
//! sessions. Nothing prevents overlapping open sessions for the same book;
//! an abandoned open session simply never contributes to the numbers.

use crate::error::Result;
use crate::storage::models::{BookReadingStats, OverallStats, ReadingSession};
use crate::storage::Database;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// How many closed sessions `overall_stats` returns as recent history
const RECENT_SESSION_LIMIT: i64 = 10;

/// Whole-minute session length, rounded to nearest
pub fn session_duration_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let millis = (end - start).num_milliseconds();
    (millis as f64 / 60_000.0).round() as i64
}

#[derive(Debug, Clone)]
pub struct StatsStore {
    db: Database,
}

impl StatsStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open a new reading session for a book
    pub async fn start_session(&self, book_id: &str) -> Result<ReadingSession> {
        let session = ReadingSession {
            id: Uuid::new_v4().to_string(),
            book_id: book_id.to_string(),
            start_time: Utc::now(),
            end_time: None,
            duration_minutes: 0,
        };

        sqlx::query(
            "INSERT INTO reading_sessions (id, book_id, start_time, end_time, duration_minutes) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&session.id)
        .bind(&session.book_id)
        .bind(session.start_time)
        .bind(session.end_time)
        .bind(session.duration_minutes)
        .execute(self.db.pool())
        .await?;

        Ok(session)
    }

    /// Close a session, computing its duration
    ///
    /// Returns `None` for an unknown session id. Closing an already closed
    /// session recomputes its end time and duration.
    pub async fn end_session(&self, session_id: &str) -> Result<Option<ReadingSession>> {
        let session =
            sqlx::query_as::<_, ReadingSession>("SELECT * FROM reading_sessions WHERE id = ?")
                .bind(session_id)
                .fetch_optional(self.db.pool())
                .await?;

        let Some(mut session) = session else {
            return Ok(None);
        };

        let end = Utc::now();
        session.duration_minutes = session_duration_minutes(session.start_time, end);
        session.end_time = Some(end);

        sqlx::query("UPDATE reading_sessions SET end_time = ?, duration_minutes = ? WHERE id = ?")
            .bind(session.end_time)
            .bind(session.duration_minutes)
            .bind(&session.id)
            .execute(self.db.pool())
            .await?;

        Ok(Some(session))
    }

    /// Aggregates over one book's closed sessions
    pub async fn book_stats(&self, book_id: &str) -> Result<BookReadingStats> {
        let (total_sessions, total_minutes, last_read_at): (i64, i64, Option<DateTime<Utc>>) =
            sqlx::query_as(
                r#"
                SELECT COUNT(*), COALESCE(SUM(duration_minutes), 0), MAX(end_time)
                FROM reading_sessions
                WHERE book_id = ? AND end_time IS NOT NULL
                "#,
            )
            .bind(book_id)
            .fetch_one(self.db.pool())
            .await?;

        Ok(BookReadingStats {
            book_id: book_id.to_string(),
            total_minutes,
            total_sessions,
            last_read_at,
        })
    }

    /// Library-wide aggregates over all closed sessions
    ///
    /// Includes a trailing seven-day window (by start time) and the most
    /// recent closed sessions for the history panel.
    pub async fn overall_stats(&self) -> Result<OverallStats> {
        let (total_minutes, total_books, average_session, longest_session): (i64, i64, f64, i64) =
            sqlx::query_as(
                r#"
                SELECT
                    COALESCE(SUM(duration_minutes), 0),
                    COUNT(DISTINCT book_id),
                    COALESCE(AVG(duration_minutes), 0.0),
                    COALESCE(MAX(duration_minutes), 0)
                FROM reading_sessions
                WHERE end_time IS NOT NULL
                "#,
            )
            .fetch_one(self.db.pool())
            .await?;

        let week_ago = Utc::now() - Duration::days(7);
        let (sessions_this_week, minutes_this_week): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(duration_minutes), 0)
            FROM reading_sessions
            WHERE end_time IS NOT NULL AND start_time >= ?
            "#,
        )
        .bind(week_ago)
        .fetch_one(self.db.pool())
        .await?;

        let recent_sessions = sqlx::query_as::<_, ReadingSession>(
            r#"
            SELECT * FROM reading_sessions
            WHERE end_time IS NOT NULL
            ORDER BY start_time DESC
            LIMIT ?
            "#,
        )
        .bind(RECENT_SESSION_LIMIT)
        .fetch_all(self.db.pool())
        .await?;

        Ok(OverallStats {
            total_minutes,
            total_books,
            average_session_minutes: average_session.round() as i64,
            longest_session_minutes: longest_session,
            sessions_this_week,
            minutes_this_week,
            recent_sessions,
        })
    }
}
