use thiserror::Error;

/// Engine-level failures surfaced to callers. Subsystems never raise
/// (anything they produce is handled by the validator and applier), so
/// this covers lifecycle misuse and the persistence boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("session not initialized; call create_session() first")]
    SessionNotInitialized,

    #[error("world not initialized; call initialize_world() first")]
    WorldNotInitialized,

    #[error("session {0} not found")]
    SessionNotFound(String),

    #[error("no snapshot found for session {session} at or before tick {tick}")]
    NoSnapshot { session: String, tick: i64 },

    #[error("persistence error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
