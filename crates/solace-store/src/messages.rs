use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use solace_core::ids::{MessageId, SessionId};

use crate::database::Database;
use crate::error::StoreError;
use crate::{format_timestamp, row_helpers};

const COLUMNS: &str =
    "id, session_id, content, is_user, timestamp, sentiment_score, sentiment_label, crisis_detected";

/// A persisted chat turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MessageRow {
    pub id: MessageId,
    pub session_id: SessionId,
    pub content: String,
    pub is_user: bool,
    pub timestamp: String,
    pub sentiment_score: Option<f64>,
    pub sentiment_label: Option<String>,
    pub crisis_detected: bool,
}

/// Fields supplied by the caller when recording a turn.
#[derive(Clone, Debug, Default)]
pub struct NewMessage {
    pub session_id: SessionId,
    pub content: String,
    pub is_user: bool,
    pub sentiment_score: Option<f64>,
    pub sentiment_label: Option<String>,
    pub crisis_detected: bool,
}

impl NewMessage {
    pub fn assistant(session_id: SessionId, content: impl Into<String>) -> Self {
        Self {
            session_id,
            content: content.into(),
            is_user: false,
            ..Default::default()
        }
    }
}

#[derive(Clone)]
pub struct MessageRepo {
    db: Database,
}

impl MessageRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn insert(&self, message: NewMessage) -> Result<MessageRow, StoreError> {
        self.insert_at(message, Utc::now())
    }

    #[instrument(skip(self, message), fields(session_id = %message.session_id, is_user = message.is_user))]
    pub fn insert_at(&self, message: NewMessage, at: DateTime<Utc>) -> Result<MessageRow, StoreError> {
        let id = MessageId::new();
        let timestamp = format_timestamp(at);

        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, session_id, content, is_user, timestamp,
                                       sentiment_score, sentiment_label, crisis_detected)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    id.as_str(),
                    message.session_id.as_str(),
                    message.content,
                    message.is_user,
                    timestamp,
                    message.sentiment_score,
                    message.sentiment_label,
                    message.crisis_detected,
                ],
            )?;

            Ok(MessageRow {
                id,
                session_id: message.session_id,
                content: message.content,
                is_user: message.is_user,
                timestamp,
                sentiment_score: message.sentiment_score,
                sentiment_label: message.sentiment_label,
                crisis_detected: message.crisis_detected,
            })
        })
    }

    /// Up to `limit` messages, newest first.
    #[instrument(skip(self), fields(session_id = %session_id))]
    pub fn recent(&self, session_id: &SessionId, limit: u32) -> Result<Vec<MessageRow>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM messages WHERE session_id = ?1
                 ORDER BY timestamp DESC, id DESC LIMIT ?2"
            ))?;
            let mut rows = stmt.query(rusqlite::params![session_id.as_str(), limit])?;
            let mut results = Vec::new();
            while let Some(row) = rows.next()? {
                results.push(row_to_message(row)?);
            }
            Ok(results)
        })
    }

    /// The last `limit` messages in chronological order.
    pub fn history(&self, session_id: &SessionId, limit: u32) -> Result<Vec<MessageRow>, StoreError> {
        let mut messages = self.recent(session_id, limit)?;
        messages.reverse();
        Ok(messages)
    }

    /// User-authored messages carrying a sentiment score, at or after `since`, oldest first.
    #[instrument(skip(self), fields(session_id = %session_id))]
    pub fn scored_user_messages_since(
        &self,
        session_id: &SessionId,
        since: DateTime<Utc>,
    ) -> Result<Vec<MessageRow>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM messages
                 WHERE session_id = ?1 AND is_user = 1
                   AND sentiment_score IS NOT NULL AND timestamp >= ?2
                 ORDER BY timestamp ASC, id ASC"
            ))?;
            let mut rows = stmt.query(rusqlite::params![session_id.as_str(), format_timestamp(since)])?;
            let mut results = Vec::new();
            while let Some(row) = rows.next()? {
                results.push(row_to_message(row)?);
            }
            Ok(results)
        })
    }

    pub fn count(&self, session_id: &SessionId) -> Result<u32, StoreError> {
        self.db.with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM messages WHERE session_id = ?1",
                [session_id.as_str()],
                |row| row.get(0),
            )?)
        })
    }
}

fn row_to_message(row: &rusqlite::Row<'_>) -> Result<MessageRow, StoreError> {
    Ok(MessageRow {
        id: MessageId::from_raw(row_helpers::get::<String>(row, 0, "messages", "id")?),
        session_id: SessionId::from_raw(row_helpers::get::<String>(row, 1, "messages", "session_id")?),
        content: row_helpers::get(row, 2, "messages", "content")?,
        is_user: row_helpers::get(row, 3, "messages", "is_user")?,
        timestamp: row_helpers::get(row, 4, "messages", "timestamp")?,
        sentiment_score: row_helpers::get_opt(row, 5, "messages", "sentiment_score")?,
        sentiment_label: row_helpers::get_opt(row, 6, "messages", "sentiment_label")?,
        crisis_detected: row_helpers::get(row, 7, "messages", "crisis_detected")?,
    })
}
