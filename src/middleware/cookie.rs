use axum::http::HeaderValue;
use hagg_config::SessionConfig;
use hagg_session::SessionId;

/// Attributes of the cookie carrying the opaque session id.
#[derive(Clone, Debug)]
pub struct SessionCookie {
    pub name: String,
    pub max_age_secs: u64,
    pub secure: bool,
}

impl SessionCookie {
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            name: config.cookie_name.clone(),
            max_age_secs: config.max_age_secs,
            secure: config.secure_cookie,
        }
    }

    // HttpOnly, scoped to path / with SameSite=Lax so top-level navigations keep it
    pub fn header_value(&self, id: &SessionId) -> Option<HeaderValue> {
        let mut value = format!(
            "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
            self.name, id, self.max_age_secs
        );
        if self.secure {
            value.push_str("; Secure");
        }
        HeaderValue::from_str(&value).ok()
    }
}
