use axum::{Router, routing::post};

use crate::state::AppState;

use super::controller::{htmx_login, htmx_logout};

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(htmx_login))
        .route("/logout", post(htmx_logout))
}
