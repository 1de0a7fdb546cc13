use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::model::User;
use crate::store::{UserStore, UserStoreError};

/// In-process user store keyed by `uid`.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from `(uid, display_name)` pairs; later duplicates are ignored.
    pub fn with_users<I, U, N>(users: I) -> Self
    where
        I: IntoIterator<Item = (U, N)>,
        U: Into<String>,
        N: Into<String>,
    {
        let store = Self::new();
        for (uid, display_name) in users {
            let (uid, display_name) = (uid.into(), display_name.into());
            store.insert(&uid, &display_name);
        }
        store
    }

    fn insert(&self, uid: &str, display_name: &str) {
        let mut users = self.users.write();
        if users.contains_key(uid) || users.values().any(|u| u.display_name == display_name) {
            return;
        }

        let now = Utc::now();
        let user = User {
            id: users.len() as i64 + 1,
            uid: uid.to_string(),
            display_name: display_name.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            created_at: now,
            updated_at: now,
        };
        users.insert(uid.to_string(), user);
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_uid(&self, uid: &str) -> Result<User, UserStoreError> {
        self.users
            .read()
            .get(uid)
            .cloned()
            .ok_or(UserStoreError::NotFound)
    }
}
