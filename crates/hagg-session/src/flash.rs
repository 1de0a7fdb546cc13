//! One-shot flash messages.
//!
//! A flash is written into the session under `flash_<level>` and read back
//! with pop semantics, so it is delivered at most once, typically on the page
//! following a redirect.

use hagg_core::notify::MessageLevel;
use serde::Serialize;

use crate::session::Session;

pub const FLASH_KEY_PREFIX: &str = "flash_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashMessage {
    pub level: MessageLevel,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct FlashStore {
    session: Session,
}

impl FlashStore {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    fn key(level: MessageLevel) -> String {
        format!("{FLASH_KEY_PREFIX}{level}")
    }

    /// Stores a message for the next read; one message per level.
    pub fn set(&self, level: MessageLevel, message: impl Into<String>) {
        self.session.insert(Self::key(level), message.into());
    }

    pub fn has(&self, level: MessageLevel) -> bool {
        self.session
            .get_str(&Self::key(level))
            .is_some_and(|m| !m.is_empty())
    }

    /// Drains every level in presentation order (success, error, warning, info).
    pub fn pop_all(&self) -> Vec<FlashMessage> {
        MessageLevel::ALL
            .into_iter()
            .filter_map(|level| {
                let message = self.session.pop_str(&Self::key(level))?;
                (!message.is_empty()).then_some(FlashMessage { level, message })
            })
            .collect()
    }
}
