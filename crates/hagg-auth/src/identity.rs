use hagg_db::User;

/// A user resolved from the session for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    user: User,
}

impl Identity {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    /// Policy subject used for permission checks.
    pub fn subject(&self) -> &str {
        self.user.subject()
    }
}
