use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use solace_core::ids::{MoodEntryId, SessionId};

use crate::database::Database;
use crate::error::StoreError;
use crate::{format_timestamp, row_helpers};

pub const MIN_MOOD_SCORE: u8 = 1;
pub const MAX_MOOD_SCORE: u8 = 5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoodRow {
    pub id: MoodEntryId,
    pub session_id: SessionId,
    pub mood_score: u8,
    pub note: Option<String>,
    pub timestamp: String,
}

#[derive(Clone)]
pub struct MoodRepo {
    db: Database,
}

impl MoodRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn insert(
        &self,
        session_id: &SessionId,
        mood_score: u8,
        note: Option<&str>,
    ) -> Result<MoodRow, StoreError> {
        self.insert_at(session_id, mood_score, note, Utc::now())
    }

    /// Scores outside 1..=5 are rejected by the table's CHECK constraint.
    #[instrument(skip(self, note), fields(session_id = %session_id))]
    pub fn insert_at(
        &self,
        session_id: &SessionId,
        mood_score: u8,
        note: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<MoodRow, StoreError> {
        let id = MoodEntryId::new();
        let timestamp = format_timestamp(at);

        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO mood_entries (id, session_id, mood_score, note, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id.as_str(), session_id.as_str(), mood_score, note, timestamp],
            )?;

            Ok(MoodRow {
                id,
                session_id: session_id.clone(),
                mood_score,
                note: note.map(str::to_string),
                timestamp,
            })
        })
    }

    /// Entries at or after `since`, oldest first.
    #[instrument(skip(self), fields(session_id = %session_id))]
    pub fn since(&self, session_id: &SessionId, since: DateTime<Utc>) -> Result<Vec<MoodRow>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, session_id, mood_score, note, timestamp FROM mood_entries
                 WHERE session_id = ?1 AND timestamp >= ?2
                 ORDER BY timestamp ASC, id ASC",
            )?;
            let mut rows = stmt.query(rusqlite::params![session_id.as_str(), format_timestamp(since)])?;
            let mut results = Vec::new();
            while let Some(row) = rows.next()? {
                results.push(row_to_mood(row)?);
            }
            Ok(results)
        })
    }
}

fn row_to_mood(row: &rusqlite::Row<'_>) -> Result<MoodRow, StoreError> {
    Ok(MoodRow {
        id: MoodEntryId::from_raw(row_helpers::get::<String>(row, 0, "mood_entries", "id")?),
        session_id: SessionId::from_raw(row_helpers::get::<String>(row, 1, "mood_entries", "session_id")?),
        mood_score: row_helpers::get(row, 2, "mood_entries", "mood_score")?,
        note: row_helpers::get_opt(row, 3, "mood_entries", "note")?,
        timestamp: row_helpers::get(row, 4, "mood_entries", "timestamp")?,
    })
}
