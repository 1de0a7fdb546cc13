use serde::Deserialize;

/// Event raised after a login swap so other fragments can refresh.
pub const AUTH_CHANGED_EVENT: &str = "auth-changed";

pub const SIGNED_OUT_MESSAGE: &str = "You have been signed out.";
pub const MISSING_UID_MESSAGE: &str = "Please enter your user id.";
pub const UNKNOWN_UID_MESSAGE: &str = "Unknown user id.";

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub uid: String,
}
