use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// A user in the system.
///
/// `uid` is the login token kept in the session and is never shown or used
/// for authorization. `display_name` is the stable, human-readable policy
/// subject.
#[derive(Serialize, FromRow, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    #[serde(skip_serializing)]
    pub uid: String,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Policy subject for this user.
    pub fn subject(&self) -> &str {
        &self.display_name
    }

    /// Human-friendly name; falls back to the display name.
    pub fn full_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (true, true) => self.display_name.clone(),
            (true, false) => self.last_name.clone(),
            (false, true) => self.first_name.clone(),
            (false, false) => format!("{}, {}", self.last_name, self.first_name),
        }
    }
}
