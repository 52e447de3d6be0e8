use async_trait::async_trait;

use solace_core::ids::SessionId;
use solace_store::messages::{MessageRepo, MessageRow, NewMessage};
use solace_store::sessions::SessionRepo;
use solace_store::{run_blocking, Database, StoreError};

/// The persistence operations a chat turn depends on.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn session_exists(&self, session_id: &SessionId) -> Result<bool, StoreError>;

    /// Up to `limit` messages of the session, newest first.
    async fn recent_messages(&self, session_id: &SessionId, limit: u32) -> Result<Vec<MessageRow>, StoreError>;

    async fn append(&self, message: NewMessage) -> Result<MessageRow, StoreError>;

    async fn touch_session(&self, session_id: &SessionId) -> Result<(), StoreError>;
}

/// `ConversationStore` over the SQLite repositories. Every call runs on the
/// blocking pool.
pub struct SqliteConversationStore {
    sessions: SessionRepo,
    messages: MessageRepo,
}

impl SqliteConversationStore {
    pub fn new(db: Database) -> Self {
        Self {
            sessions: SessionRepo::new(db.clone()),
            messages: MessageRepo::new(db),
        }
    }
}

#[async_trait]
impl ConversationStore for SqliteConversationStore {
    async fn session_exists(&self, session_id: &SessionId) -> Result<bool, StoreError> {
        let sessions = self.sessions.clone();
        let session_id = session_id.clone();
        run_blocking(move || sessions.exists(&session_id)).await
    }

    async fn recent_messages(&self, session_id: &SessionId, limit: u32) -> Result<Vec<MessageRow>, StoreError> {
        let messages = self.messages.clone();
        let session_id = session_id.clone();
        run_blocking(move || messages.recent(&session_id, limit)).await
    }

    async fn append(&self, message: NewMessage) -> Result<MessageRow, StoreError> {
        let messages = self.messages.clone();
        run_blocking(move || messages.insert(message)).await
    }

    async fn touch_session(&self, session_id: &SessionId) -> Result<(), StoreError> {
        let sessions = self.sessions.clone();
        let session_id = session_id.clone();
        run_blocking(move || sessions.touch(&session_id)).await
    }
}
