use std::any::Any;

use axum::{
    Router,
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Response},
};
use hagg_core::errors::GENERIC_ERROR_MESSAGE;
use tower_http::catch_panic::CatchPanicLayer;

use crate::logging::logging_middleware;
use crate::metrics::{metrics_middleware, track_panic_recovered};
use crate::middleware::pipeline::session_pipeline;
use crate::modules::auth::init_auth_router;
use crate::modules::pages::init_pages_router;
use crate::state::AppState;

pub fn init_router(state: AppState) -> Router {
    let routes = Router::new()
        .merge(init_pages_router(state.clone()))
        .nest("/htmx", init_auth_router());

    with_pipeline(state, routes)
}

/// Mounts `routes` under the base path behind the session pipeline and the
/// outer observability and recovery layers.
pub fn with_pipeline(state: AppState, routes: Router<AppState>) -> Router {
    let app = routes
        .layer(middleware::from_fn_with_state(state.clone(), session_pipeline))
        .with_state(state.clone());

    let app = match state.base_path.as_str() {
        "" => app,
        prefix => Router::new().nest(prefix, app),
    };

    app.layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(CatchPanicLayer::custom(handle_panic))
}

// Last resort for panics outside the session pipeline; no session or events here.
fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_default();
    tracing::error!(panic = %detail, "Recovered from panic outside the session pipeline");
    track_panic_recovered();

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(format!("<p>{GENERIC_ERROR_MESSAGE}</p>")),
    )
        .into_response()
}
