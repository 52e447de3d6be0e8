use solace_store::StoreError;

/// Failures surfaced by a chat turn. Generation failures never appear here:
/// they are absorbed into the fallback reply.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("session not found: {0}")]
    SessionNotFound(String),
}
