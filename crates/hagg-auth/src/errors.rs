use hagg_db::UserStoreError;

use crate::enforcer::EnforcerError;

/// Authentication and authorization outcomes.
///
/// `NotAuthenticated` and `PermissionDenied` are normal control flow and map
/// to a redirect or a 403. The fault variants are infrastructure failures and
/// map to a 500 whose text is never shown to the user.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("User not found")]
    NotFound,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Policy engine fault: {0}")]
    EnforcerFault(#[from] EnforcerError),

    #[error("User store fault: {0}")]
    UserStoreFault(UserStoreError),
}

impl AuthError {
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            AuthError::EnforcerFault(_) | AuthError::UserStoreFault(_)
        )
    }
}

impl From<UserStoreError> for AuthError {
    fn from(err: UserStoreError) -> Self {
        match err {
            UserStoreError::NotFound => AuthError::NotFound,
            other => AuthError::UserStoreFault(other),
        }
    }
}
