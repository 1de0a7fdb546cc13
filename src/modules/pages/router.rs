use axum::{Router, middleware, routing::get};

use crate::middleware::guard::{RequiredPermission, require_auth, require_permission};
use crate::state::AppState;

use super::controller::{dashboard, home, home_login, profile};

/// Action required to open the dashboard.
pub const DASHBOARD_VIEW: &str = "dashboard:view";

pub fn init_pages_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(home).post(home_login))
        .merge(
            Router::new()
                .route("/profile", get(profile))
                .route_layer(middleware::from_fn_with_state(state.clone(), require_auth)),
        )
        .merge(
            Router::new()
                .route("/dashboard", get(dashboard))
                .route_layer(middleware::from_fn_with_state(
                    RequiredPermission::new(state, DASHBOARD_VIEW),
                    require_permission,
                )),
        )
}
