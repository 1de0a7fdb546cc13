use crate::{ConfigError, parse_number};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStoreKind {
    Memory,
    Redis,
}

/// Session cookie and storage configuration.
///
/// # Environment Variables
///
/// - `SESSION_COOKIE_NAME`: cookie carrying the session id (default: `hagg_session`)
/// - `SESSION_MAX_AGE_SECS`: session lifetime in seconds (default: `2592000`, 30 days)
/// - `SESSION_SECURE_COOKIE`: set the `Secure` attribute (default: `false`)
/// - `SESSION_STORE`: `memory` or `redis` (default: `memory`)
/// - `REDIS_URL`: redis connection URL (default: `redis://127.0.0.1:6379`)
/// - `SESSION_KEY_PREFIX`: prefix for redis keys (default: `hagg:session`)
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub max_age_secs: u64,
    pub secure_cookie: bool,
    pub store: SessionStoreKind,
    pub redis_url: String,
    pub key_prefix: String,
}

impl SessionConfig {
    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store = match lookup("SESSION_STORE").as_deref().map(str::trim) {
            None | Some("") | Some("memory") => SessionStoreKind::Memory,
            Some("redis") => SessionStoreKind::Redis,
            Some(other) => return Err(ConfigError::UnknownStore(other.to_string())),
        };

        Ok(Self {
            cookie_name: lookup("SESSION_COOKIE_NAME").unwrap_or_else(|| "hagg_session".into()),
            max_age_secs: parse_number(lookup, "SESSION_MAX_AGE_SECS", 2_592_000)?, // 30 days
            secure_cookie: lookup("SESSION_SECURE_COOKIE")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(false),
            store,
            redis_url: lookup("REDIS_URL").unwrap_or_else(|| "redis://127.0.0.1:6379".into()),
            key_prefix: lookup("SESSION_KEY_PREFIX").unwrap_or_else(|| "hagg:session".into()),
        })
    }
}
