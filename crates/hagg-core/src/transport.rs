//! Request classification for the two response encodings.
//!
//! A request carrying `HX-Request: true` was issued by the client-side
//! hypermedia layer and expects a partial update. Everything else is a
//! full-page load. The mode is decided once per request and consumed by
//! event commit and redirect handling.

use axum::http::HeaderMap;

/// Request marker sent by the client-side update layer.
pub const HX_REQUEST: &str = "hx-request";
/// Redirect directive honored by the client-side update layer instead of a 3xx.
pub const HX_REDIRECT: &str = "hx-redirect";
pub const HX_TRIGGER: &str = "hx-trigger";
pub const HX_TRIGGER_AFTER_SWAP: &str = "hx-trigger-after-swap";
pub const HX_TRIGGER_AFTER_SETTLE: &str = "hx-trigger-after-settle";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportMode {
    #[default]
    FullPage,
    PartialUpdate,
}

impl TransportMode {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        match headers.get(HX_REQUEST).and_then(|v| v.to_str().ok()) {
            Some(value) if value.trim().eq_ignore_ascii_case("true") => Self::PartialUpdate,
            _ => Self::FullPage,
        }
    }

    pub fn is_partial(self) -> bool {
        self == Self::PartialUpdate
    }
}
