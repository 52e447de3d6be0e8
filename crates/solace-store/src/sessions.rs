use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use solace_core::ids::SessionId;

use crate::database::Database;
use crate::error::StoreError;
use crate::{format_timestamp, now_timestamp, row_helpers};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionRow {
    pub id: SessionId,
    pub nickname: Option<String>,
    pub created_at: String,
    pub last_activity: String,
    pub settings: serde_json::Value,
}

#[derive(Clone)]
pub struct SessionRepo {
    db: Database,
}

impl SessionRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a new session.
    #[instrument(skip(self))]
    pub fn create(&self, nickname: Option<&str>) -> Result<SessionRow, StoreError> {
        let id = SessionId::new();
        let now = now_timestamp();

        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO sessions (id, nickname, created_at, last_activity, settings)
                 VALUES (?1, ?2, ?3, ?4, '{}')",
                rusqlite::params![id.as_str(), nickname, now, now],
            )?;

            Ok(SessionRow {
                id,
                nickname: nickname.map(str::to_string),
                created_at: now.clone(),
                last_activity: now,
                settings: serde_json::json!({}),
            })
        })
    }

    /// Get a session by ID.
    #[instrument(skip(self), fields(session_id = %id))]
    pub fn get(&self, id: &SessionId) -> Result<SessionRow, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, nickname, created_at, last_activity, settings
                 FROM sessions WHERE id = ?1",
            )?;
            let mut rows = stmt.query([id.as_str()])?;
            match rows.next()? {
                Some(row) => row_to_session(row),
                None => Err(StoreError::NotFound(format!("session {id}"))),
            }
        })
    }

    pub fn exists(&self, id: &SessionId) -> Result<bool, StoreError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM sessions WHERE id = ?1",
                [id.as_str()],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
    }

    /// Mark the session as active now.
    pub fn touch(&self, id: &SessionId) -> Result<(), StoreError> {
        self.set_last_activity(id, Utc::now())
    }

    #[instrument(skip(self), fields(session_id = %id))]
    pub fn set_last_activity(&self, id: &SessionId, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "UPDATE sessions SET last_activity = ?1 WHERE id = ?2",
                rusqlite::params![format_timestamp(at), id.as_str()],
            )?;
            Ok(())
        })
    }

    /// Ids of sessions whose last activity is strictly before `cutoff`.
    #[instrument(skip(self))]
    pub fn inactive_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<SessionId>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id FROM sessions WHERE last_activity < ?1")?;
            let ids = stmt
                .query_map([format_timestamp(cutoff)], |row| row.get::<_, String>(0))?
                .map(|r| r.map(SessionId::from_raw))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ids)
        })
    }

    /// Hard delete: the session, its messages and its mood entries.
    /// Returns whether a session row existed.
    #[instrument(skip(self), fields(session_id = %id))]
    pub fn delete(&self, id: &SessionId) -> Result<bool, StoreError> {
        self.db.with_transaction(|tx| {
            tx.execute("DELETE FROM messages WHERE session_id = ?1", [id.as_str()])?;
            tx.execute("DELETE FROM mood_entries WHERE session_id = ?1", [id.as_str()])?;
            let removed = tx.execute("DELETE FROM sessions WHERE id = ?1", [id.as_str()])?;
            Ok(removed > 0)
        })
    }
}

fn row_to_session(row: &rusqlite::Row<'_>) -> Result<SessionRow, StoreError> {
    let settings: String = row_helpers::get(row, 4, "sessions", "settings")?;

    Ok(SessionRow {
        id: SessionId::from_raw(row_helpers::get::<String>(row, 0, "sessions", "id")?),
        nickname: row_helpers::get_opt(row, 1, "sessions", "nickname")?,
        created_at: row_helpers::get(row, 2, "sessions", "created_at")?,
        last_activity: row_helpers::get(row, 3, "sessions", "last_activity")?,
        settings: row_helpers::parse_json(&settings, "sessions", "settings")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn repo() -> SessionRepo {
        SessionRepo::new(Database::in_memory().unwrap())
    }

    #[test]
    fn create_session() {
        let repo = repo();
        let session = repo.create(Some("river")).unwrap();
        assert!(session.id.as_str().starts_with("sess_"));
        assert_eq!(session.nickname.as_deref(), Some("river"));
        assert_eq!(session.created_at, session.last_activity);
        assert_eq!(session.settings, serde_json::json!({}));
    }

    #[test]
    fn get_session_roundtrips_fields() {
        let repo = repo();
        let created = repo.create(None).unwrap();
        let fetched = repo.get(&created.id).unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn get_nonexistent_is_not_found() {
        let repo = repo();
        let result = repo.get(&SessionId::from_raw("sess_missing"));
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn exists_reflects_creation() {
        let repo = repo();
        let session = repo.create(None).unwrap();
        assert!(repo.exists(&session.id).unwrap());
        assert!(!repo.exists(&SessionId::from_raw("sess_missing")).unwrap());
    }

    #[test]
    fn touch_advances_last_activity() {
        let repo = repo();
        let session = repo.create(None).unwrap();
        repo.set_last_activity(&session.id, Utc::now() - Duration::days(3)).unwrap();
        let stale = repo.get(&session.id).unwrap().last_activity;

        repo.touch(&session.id).unwrap();
        let fresh = repo.get(&session.id).unwrap().last_activity;
        assert!(fresh > stale);
    }

    #[test]
    fn inactive_since_selects_stale_sessions() {
        let repo = repo();
        let stale = repo.create(None).unwrap();
        let active = repo.create(None).unwrap();
        repo.set_last_activity(&stale.id, Utc::now() - Duration::days(45)).unwrap();

        let ids = repo.inactive_since(Utc::now() - Duration::days(30)).unwrap();
        assert_eq!(ids, vec![stale.id]);
        assert!(!ids.contains(&active.id));
    }

    #[test]
    fn delete_session_reports_existence() {
        let repo = repo();
        let session = repo.create(None).unwrap();
        assert!(repo.delete(&session.id).unwrap());
        assert!(repo.get(&session.id).is_err());
        assert!(!repo.delete(&session.id).unwrap());
    }

    #[test]
    fn corrupt_settings_returns_error() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO sessions (id, created_at, last_activity, settings)
                 VALUES ('sess_bad', 'x', 'x', 'not json')",
                [],
            )?;
            Ok(())
        })
        .unwrap();

        let repo = SessionRepo::new(db);
        let result = repo.get(&SessionId::from_raw("sess_bad"));
        assert!(matches!(result, Err(StoreError::CorruptRow { column: "settings", .. })));
    }
}
