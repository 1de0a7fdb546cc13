use std::sync::Arc;

use hagg_db::UserStore;
use hagg_session::Session;
use tracing::{debug, instrument, warn};

use crate::errors::AuthError;
use crate::identity::Identity;

/// Session attribute holding the login token of the authenticated user.
pub const SESSION_KEY_UID: &str = "uid";

/// Establishes, clears and resolves the identity stored in a session.
///
/// The authenticator only mutates the session; persisting it is left to the
/// request pipeline, which saves the session once the response is built.
#[derive(Clone)]
pub struct SessionAuthenticator {
    users: Arc<dyn UserStore>,
}

impl SessionAuthenticator {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Looks up `uid` and, on success, stores it in the session under a new
    /// session id.
    ///
    /// # Errors
    ///
    /// `AuthError::NotFound` when no user matches; the session is untouched.
    #[instrument(skip(self, session, uid))]
    pub async fn login(&self, session: &Session, uid: &str) -> Result<Identity, AuthError> {
        let uid = uid.trim();
        if uid.is_empty() {
            return Err(AuthError::NotFound);
        }

        let user = self.users.find_by_uid(uid).await?;
        session.insert(SESSION_KEY_UID, user.uid.clone());
        session.regenerate();

        debug!(subject = %user.subject(), "User logged in");
        Ok(Identity::new(user))
    }

    /// Removes the identity attribute. Calling it without a login is a no-op.
    pub fn logout(&self, session: &Session) {
        session.remove(SESSION_KEY_UID);
    }

    pub async fn is_authenticated(&self, session: &Session) -> bool {
        self.current_user(session).await.is_some()
    }

    /// Resolves the session's login token against the user store.
    ///
    /// Absent or empty tokens, unknown users and store failures all resolve to
    /// `None`. The lookup is repeated on every call.
    #[instrument(skip(self, session))]
    pub async fn current_user(&self, session: &Session) -> Option<Identity> {
        let uid = session.get_str(SESSION_KEY_UID)?;
        if uid.is_empty() {
            return None;
        }

        match self.users.find_by_uid(&uid).await {
            Ok(user) => Some(Identity::new(user)),
            Err(e) => {
                warn!(error = %e, "Session identity could not be resolved");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use hagg_db::{MemoryUserStore, User, UserStoreError};
    use hagg_session::{SessionId, SessionRecord};
    use hagg_session::SessionValue;

    fn authenticator() -> SessionAuthenticator {
        SessionAuthenticator::new(Arc::new(MemoryUserStore::with_users([
            ("u-alice", "alice"),
            ("u-bob", "bob"),
        ])))
    }

    struct BrokenUserStore;

    #[async_trait]
    impl UserStore for BrokenUserStore {
        async fn find_by_uid(&self, _uid: &str) -> Result<User, UserStoreError> {
            Err(UserStoreError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    #[tokio::test]
    async fn fresh_session_is_not_authenticated() {
        assert!(!authenticator().is_authenticated(&Session::new()).await);
    }

    #[tokio::test]
    async fn login_then_current_user_round_trips() {
        let auth = authenticator();
        let session = Session::new();

        let identity = auth.login(&session, "u-alice").await.unwrap();
        let current = auth.current_user(&session).await.unwrap();

        assert_eq!(identity, current);
        assert_eq!(current.subject(), "alice");
        assert_eq!(
            session.get(SESSION_KEY_UID),
            Some(SessionValue::Str("u-alice".into()))
        );
    }

    #[tokio::test]
    async fn login_rotates_session_id() {
        let stored = SessionId::generate();
        let session = Session::from_record(stored, SessionRecord::default());

        authenticator().login(&session, "u-alice").await.unwrap();

        assert_ne!(session.id(), stored);
    }

    #[tokio::test]
    async fn failed_login_leaves_session_untouched() {
        let auth = authenticator();
        let session = Session::new();
        auth.login(&session, "u-bob").await.unwrap();

        let err = auth.login(&session, "u-nobody").await.unwrap_err();

        assert!(matches!(err, AuthError::NotFound));
        assert_eq!(session.get_str(SESSION_KEY_UID).as_deref(), Some("u-bob"));
    }

    #[tokio::test]
    async fn empty_uid_is_not_found() {
        let session = Session::new();
        let err = authenticator().login(&session, "  ").await.unwrap_err();
        assert!(matches!(err, AuthError::NotFound));
        assert!(!session.is_modified());
    }

    #[tokio::test]
    async fn logout_is_idempotent() {
        let auth = authenticator();
        let session = Session::new();
        auth.login(&session, "u-alice").await.unwrap();

        auth.logout(&session);
        let once = session.record();
        auth.logout(&session);

        assert_eq!(session.record(), once);
        assert!(!auth.is_authenticated(&session).await);
    }

    #[tokio::test]
    async fn empty_token_counts_as_absent() {
        let session = Session::new();
        session.insert(SESSION_KEY_UID, "");
        assert!(authenticator().current_user(&session).await.is_none());
    }

    #[tokio::test]
    async fn unresolvable_token_is_not_authenticated() {
        let session = Session::new();
        session.insert(SESSION_KEY_UID, "u-deleted");
        assert!(!authenticator().is_authenticated(&session).await);
    }

    #[tokio::test]
    async fn store_failure_is_not_authenticated() {
        let auth = SessionAuthenticator::new(Arc::new(BrokenUserStore));
        let session = Session::new();
        session.insert(SESSION_KEY_UID, "u-alice");

        assert!(auth.current_user(&session).await.is_none());
    }

    #[tokio::test]
    async fn login_propagates_store_faults() {
        let auth = SessionAuthenticator::new(Arc::new(BrokenUserStore));
        let err = auth.login(&Session::new(), "u-alice").await.unwrap_err();
        assert!(err.is_fault());
    }
}
