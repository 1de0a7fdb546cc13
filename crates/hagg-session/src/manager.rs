use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::record::SessionId;
use crate::session::Session;
use crate::store::{SessionError, SessionStore};

/// Explicitly constructed session handle shared by the whole application.
///
/// The manager owns the store and the session lifetime; it is cloned into the
/// application state and handed to the request pipeline.
#[derive(Debug, Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Loads the session named by a cookie value.
    ///
    /// A missing, malformed, expired or unknown id yields a fresh session.
    /// Only a failing store is an error.
    #[instrument(skip(self, cookie_value))]
    pub async fn load(&self, cookie_value: Option<&str>) -> Result<Session, SessionError> {
        let Some(id) = cookie_value.and_then(SessionId::parse) else {
            return Ok(Session::new());
        };

        match self.store.load(&id).await? {
            Some(record) => Ok(Session::from_record(id, record)),
            None => {
                debug!("Unknown or expired session id, starting a new session");
                Ok(Session::new())
            }
        }
    }

    /// Persists the session if anything changed during the request.
    ///
    /// Returns whether the store was written. A record retired by
    /// [`Session::regenerate`] is deleted afterwards; if that fails it is left
    /// to expire.
    #[instrument(skip(self, session), fields(session.new = session.is_new()))]
    pub async fn save(&self, session: &Session) -> Result<bool, SessionError> {
        if !session.is_modified() {
            return Ok(false);
        }

        self.store
            .save(&session.id(), &session.record(), self.ttl)
            .await?;
        session.mark_saved();

        if let Some(retired) = session.take_retired() {
            if let Err(e) = self.store.delete(&retired).await {
                warn!(error = %e, "Failed to delete retired session record");
            }
        }

        Ok(true)
    }
}
