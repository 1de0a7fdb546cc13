//! Toast notifications.
//!
//! A toast is an ordinary event named [`TOAST_EVENT`] in the
//! [`Phase::Immediate`] phase, so it follows the same dual encoding as every
//! other event: a header for partial updates, markup for full pages.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::events::{EventBus, Phase};

pub const TOAST_EVENT: &str = "toast";
pub const DEFAULT_TIMEOUT_MS: u32 = 3000;
pub const DEFAULT_POSITION: &str = "bottom-right";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Success,
    Error,
    Warning,
    Info,
}

impl MessageLevel {
    /// Presentation order used wherever several levels are drained at once.
    pub const ALL: [MessageLevel; 4] = [
        MessageLevel::Success,
        MessageLevel::Error,
        MessageLevel::Warning,
        MessageLevel::Info,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MessageLevel::Success => "success",
            MessageLevel::Error => "error",
            MessageLevel::Warning => "warning",
            MessageLevel::Info => "info",
        }
    }
}

impl std::fmt::Display for MessageLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub level: MessageLevel,
    pub timeout: u32,
    pub position: String,
}

impl Toast {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: MessageLevel::Info,
            timeout: DEFAULT_TIMEOUT_MS,
            position: DEFAULT_POSITION.to_string(),
        }
    }

    pub fn level(mut self, level: MessageLevel) -> Self {
        self.level = level;
        self
    }

    pub fn success(self) -> Self {
        self.level(MessageLevel::Success)
    }

    pub fn error(self) -> Self {
        self.level(MessageLevel::Error)
    }

    pub fn warning(self) -> Self {
        self.level(MessageLevel::Warning)
    }

    pub fn info(self) -> Self {
        self.level(MessageLevel::Info)
    }

    /// Buffers the toast on the request's event bus.
    pub fn notify(self, bus: &mut EventBus) {
        bus.add(Phase::Immediate, TOAST_EVENT, self);
    }
}

impl From<Toast> for Value {
    fn from(toast: Toast) -> Self {
        json!({
            "message": toast.message,
            "level": toast.level.as_str(),
            "timeout": toast.timeout,
            "position": toast.position,
        })
    }
}
