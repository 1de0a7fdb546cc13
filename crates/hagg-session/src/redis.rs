//! Redis-backed session store.
//!
//! Records are stored as JSON under `{prefix}:{session_id}` with `SETEX`, so
//! expiry is owned by redis.

use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, error, instrument};

use crate::record::{SessionId, SessionRecord};
use crate::store::{SessionError, SessionStore};

/// Redis session store with connection pooling.
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: ConnectionManager,
    key_prefix: String,
}

impl std::fmt::Debug for RedisSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisSessionStore")
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}

impl RedisSessionStore {
    /// Connects to redis.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Redis` if the connection fails.
    pub async fn new(redis_url: &str, key_prefix: impl Into<String>) -> Result<Self, SessionError> {
        let client = Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;

        Ok(Self {
            conn,
            key_prefix: key_prefix.into(),
        })
    }

    fn key(&self, id: &SessionId) -> String {
        format!("{}:{}", self.key_prefix, id)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    #[instrument(skip(self), fields(session.operation = "GET"))]
    async fn load(&self, id: &SessionId) -> Result<Option<SessionRecord>, SessionError> {
        let mut conn = self.conn.clone();
        let key = self.key(id);

        let raw = conn.get::<_, Option<String>>(&key).await.map_err(|e| {
            error!(session.key = %key, error = %e, "Redis GET error");
            e
        })?;

        match raw {
            Some(json) => {
                debug!(session.key = %key, "Session hit");
                Ok(Some(serde_json::from_str(&json)?))
            }
            None => {
                debug!(session.key = %key, "Session miss");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, record), fields(session.operation = "SETEX"))]
    async fn save(
        &self,
        id: &SessionId,
        record: &SessionRecord,
        ttl: Duration,
    ) -> Result<(), SessionError> {
        let mut conn = self.conn.clone();
        let key = self.key(id);
        let json = serde_json::to_string(record)?;

        conn.set_ex::<_, _, ()>(&key, json, ttl.as_secs().max(1))
            .await?;

        debug!(session.key = %key, session.ttl_secs = %ttl.as_secs(), "Session saved");

        Ok(())
    }

    #[instrument(skip(self), fields(session.operation = "DEL"))]
    async fn delete(&self, id: &SessionId) -> Result<(), SessionError> {
        let mut conn = self.conn.clone();
        let key = self.key(id);

        conn.del::<_, ()>(&key).await?;

        debug!(session.key = %key, "Session deleted");

        Ok(())
    }
}
