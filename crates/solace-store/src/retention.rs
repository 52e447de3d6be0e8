use chrono::{DateTime, Duration, Utc};
use tracing::{info, instrument};

use crate::database::Database;
use crate::error::StoreError;
use crate::row_helpers::placeholders;
use crate::sessions::SessionRepo;

pub const DEFAULT_RETENTION_DAYS: u32 = 30;

/// Ids bound per DELETE statement, well under SQLite's variable limit.
const DELETE_CHUNK: usize = 500;

/// Purges sessions (with their messages and mood entries) that have been idle
/// longer than the retention window.
pub struct RetentionSweep {
    db: Database,
}

impl RetentionSweep {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Returns the number of sessions removed. A window reaching past the
    /// earliest representable date cannot contain a stale session.
    pub fn run(&self, max_age_days: u32) -> Result<usize, StoreError> {
        match Duration::try_days(i64::from(max_age_days)).and_then(|age| Utc::now().checked_sub_signed(age)) {
            Some(cutoff) => self.run_with_cutoff(cutoff),
            None => Ok(0),
        }
    }

    #[instrument(skip(self))]
    pub fn run_with_cutoff(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        let stale = SessionRepo::new(self.db.clone()).inactive_since(cutoff)?;
        if stale.is_empty() {
            return Ok(0);
        }

        let ids: Vec<&str> = stale.iter().map(|id| id.as_str()).collect();

        self.db.with_transaction(|tx| {
            for chunk in ids.chunks(DELETE_CHUNK) {
                let in_list = placeholders(chunk.len());
                tx.execute(
                    &format!("DELETE FROM messages WHERE session_id IN ({in_list})"),
                    rusqlite::params_from_iter(chunk),
                )?;
                tx.execute(
                    &format!("DELETE FROM mood_entries WHERE session_id IN ({in_list})"),
                    rusqlite::params_from_iter(chunk),
                )?;
                tx.execute(
                    &format!("DELETE FROM sessions WHERE id IN ({in_list})"),
                    rusqlite::params_from_iter(chunk),
                )?;
            }
            Ok(())
        })?;

        info!(count = stale.len(), "cleaned up old sessions");
        Ok(stale.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{MessageRepo, NewMessage};
    use crate::moods::MoodRepo;

    #[test]
    fn sweep_purges_only_stale_sessions_and_their_data() {
        let db = Database::in_memory().unwrap();
        let sessions = SessionRepo::new(db.clone());
        let messages = MessageRepo::new(db.clone());
        let moods = MoodRepo::new(db.clone());

        let stale = sessions.create(None).unwrap().id;
        let active = sessions.create(None).unwrap().id;
        for sid in [&stale, &active] {
            messages.insert(NewMessage::assistant(sid.clone(), "hi")).unwrap();
            moods.insert(sid, 3, None).unwrap();
        }
        sessions.set_last_activity(&stale, Utc::now() - Duration::days(31)).unwrap();

        let purged = RetentionSweep::new(db.clone()).run(DEFAULT_RETENTION_DAYS).unwrap();
        assert_eq!(purged, 1);

        assert!(!sessions.exists(&stale).unwrap());
        assert_eq!(messages.count(&stale).unwrap(), 0);
        assert!(moods.since(&stale, Utc::now() - Duration::days(365)).unwrap().is_empty());

        assert!(sessions.exists(&active).unwrap());
        assert_eq!(messages.count(&active).unwrap(), 1);
    }

    #[test]
    fn sweep_purges_more_sessions_than_one_statement_binds() {
        let db = Database::in_memory().unwrap();
        let sessions = SessionRepo::new(db.clone());
        let long_ago = Utc::now() - Duration::days(90);
        let total = DELETE_CHUNK * 2 + 7;
        for _ in 0..total {
            let id = sessions.create(None).unwrap().id;
            sessions.set_last_activity(&id, long_ago).unwrap();
        }
        let survivor = sessions.create(None).unwrap().id;

        assert_eq!(RetentionSweep::new(db.clone()).run(30).unwrap(), total);
        assert!(sessions.exists(&survivor).unwrap());
        assert_eq!(sessions.inactive_since(Utc::now()).unwrap(), vec![survivor]);
    }

    #[test]
    fn sweep_with_huge_window_purges_nothing() {
        let db = Database::in_memory().unwrap();
        let sessions = SessionRepo::new(db.clone());
        let id = sessions.create(None).unwrap().id;
        sessions.set_last_activity(&id, Utc::now() - Duration::days(400)).unwrap();

        assert_eq!(RetentionSweep::new(db).run(u32::MAX).unwrap(), 0);
        assert!(sessions.exists(&id).unwrap());
    }

    #[test]
    fn sweep_with_nothing_stale_is_a_no_op() {
        let db = Database::in_memory().unwrap();
        SessionRepo::new(db.clone()).create(None).unwrap();
        assert_eq!(RetentionSweep::new(db).run(30).unwrap(), 0);
    }
}
