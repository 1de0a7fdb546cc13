//! Route guards.
//!
//! Each guard evaluates to a [`GuardOutcome`]. Authentication and permission
//! denials are ordinary outcomes; only infrastructure faults become `500`.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use hagg_auth::{AuthError, Identity};
use hagg_core::{MessageLevel, Toast, errors::GENERIC_ERROR_MESSAGE};
use tracing::{debug, error, warn};

use crate::metrics::{track_auth_redirect, track_permission_check};
use crate::middleware::context::RequestContext;
use crate::render;
use crate::state::AppState;

/// Where unauthenticated requests are sent, relative to the mount prefix.
pub const LOGIN_PATH: &str = "/";
pub const UNAUTHORIZED_FLASH: &str = "Unauthorized";
pub const PERMISSION_DENIED_MESSAGE: &str = "Permission denied.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Continue,
    RedirectTo(String),
    Abort(StatusCode),
}

/// Resolves the session identity and caches it on the context.
///
/// Without one, flashes [`UNAUTHORIZED_FLASH`] and redirects to the login page.
pub async fn check_auth(state: &AppState, ctx: &RequestContext) -> GuardOutcome {
    let result = authenticate(state, ctx).await.map(|_| ());
    settle(ctx, result)
}

/// [`check_auth`] followed by a policy check of `action` for the identity.
///
/// The policy engine is never consulted for an unauthenticated request.
pub async fn check_permission(
    state: &AppState,
    ctx: &RequestContext,
    action: &str,
) -> GuardOutcome {
    let result = authorize(state, ctx, action).await;
    settle(ctx, result)
}

async fn authenticate(state: &AppState, ctx: &RequestContext) -> Result<Identity, AuthError> {
    let identity = state
        .auth
        .current_user(ctx.session())
        .await
        .ok_or(AuthError::NotAuthenticated)?;
    ctx.set_identity(identity.clone());
    Ok(identity)
}

async fn authorize(state: &AppState, ctx: &RequestContext, action: &str) -> Result<(), AuthError> {
    let identity = authenticate(state, ctx).await?;

    let allowed = state
        .permissions
        .check(identity.subject(), action)
        .await
        .inspect_err(|e| {
            error!(subject = %identity.subject(), action, error = %e, "Policy engine fault");
        })?;
    if !allowed {
        warn!(subject = %identity.subject(), action, "Permission denied");
        return Err(AuthError::PermissionDenied);
    }

    track_permission_check("allowed");
    Ok(())
}

// Applies the user-visible side effects of a guard result.
fn settle(ctx: &RequestContext, result: Result<(), AuthError>) -> GuardOutcome {
    let err = match result {
        Ok(()) => return GuardOutcome::Continue,
        Err(err) => err,
    };

    match err {
        AuthError::NotAuthenticated | AuthError::NotFound => {
            ctx.flash().set(MessageLevel::Warning, UNAUTHORIZED_FLASH);
            track_auth_redirect();
            GuardOutcome::RedirectTo(ctx.url(LOGIN_PATH))
        }
        AuthError::PermissionDenied => {
            track_permission_check("denied");
            ctx.notify(Toast::new(PERMISSION_DENIED_MESSAGE).warning());
            GuardOutcome::Abort(StatusCode::FORBIDDEN)
        }
        fault => {
            debug!(error = %fault, "Guard fault");
            track_permission_check("fault");
            ctx.notify(Toast::new(GENERIC_ERROR_MESSAGE).error());
            GuardOutcome::Abort(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Turns a terminal outcome into its response; `Continue` yields `None`.
pub fn outcome_response(ctx: &RequestContext, outcome: GuardOutcome) -> Option<Response> {
    match outcome {
        GuardOutcome::Continue => None,
        GuardOutcome::RedirectTo(url) => Some(ctx.redirect(&url)),
        GuardOutcome::Abort(StatusCode::FORBIDDEN) => Some(render::error_page(
            ctx,
            StatusCode::FORBIDDEN,
            PERMISSION_DENIED_MESSAGE,
        )),
        GuardOutcome::Abort(status) => Some(render::error_page(ctx, status, GENERIC_ERROR_MESSAGE)),
    }
}

pub async fn require_auth(
    State(state): State<AppState>,
    ctx: RequestContext,
    req: Request,
    next: Next,
) -> Response {
    let outcome = check_auth(&state, &ctx).await;
    match outcome_response(&ctx, outcome) {
        Some(response) => response,
        None => next.run(req).await,
    }
}

/// Guard state naming the action a route requires.
#[derive(Clone)]
pub struct RequiredPermission {
    pub state: AppState,
    pub action: &'static str,
}

impl RequiredPermission {
    pub fn new(state: AppState, action: &'static str) -> Self {
        Self { state, action }
    }
}

/// Route layer checking the action named by [`RequiredPermission`].
///
/// ```ignore
/// let guard = RequiredPermission::new(state, "dashboard:view");
/// router.route_layer(from_fn_with_state(guard, require_permission))
/// ```
pub async fn require_permission(
    State(required): State<RequiredPermission>,
    ctx: RequestContext,
    req: Request,
    next: Next,
) -> Response {
    let outcome = check_permission(&required.state, &ctx, required.action).await;
    debug!(action = required.action, outcome = ?outcome, "Permission guard evaluated");
    match outcome_response(&ctx, outcome) {
        Some(response) => response,
        None => next.run(req).await,
    }
}
