use std::time::Duration;

use async_trait::async_trait;

use crate::record::{SessionId, SessionRecord};

/// Error type for session storage operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Session backend error: {0}")]
    Backend(String),
}

/// Key/value storage for session records with a time-to-live.
///
/// Implementations are shared by every in-flight request and must tolerate
/// concurrent calls. An expired or unknown id loads as `None`.
#[async_trait]
pub trait SessionStore: Send + Sync + std::fmt::Debug {
    async fn load(&self, id: &SessionId) -> Result<Option<SessionRecord>, SessionError>;

    async fn save(
        &self,
        id: &SessionId,
        record: &SessionRecord,
        ttl: Duration,
    ) -> Result<(), SessionError>;

    async fn delete(&self, id: &SessionId) -> Result<(), SessionError>;
}
