use axum::{
    Form,
    extract::State,
    response::{Html, Response},
};
use hagg_auth::{AuthError, Identity};
use hagg_core::{AppError, MessageLevel, Phase, Toast};
use tracing::{info, instrument};

use crate::metrics::track_login;
use crate::middleware::context::RequestContext;
use crate::render;
use crate::state::AppState;

use super::model::{
    AUTH_CHANGED_EVENT, LoginForm, MISSING_UID_MESSAGE, SIGNED_OUT_MESSAGE, UNKNOWN_UID_MESSAGE,
};

/// Outcome of a login attempt that the caller presents to the user.
pub enum LoginAttempt {
    SignedIn(Identity),
    Rejected(&'static str),
}

/// Shared by the partial and full-page login forms.
///
/// Unknown or empty ids are a normal rejection; store faults are errors.
pub async fn attempt_login(
    state: &AppState,
    ctx: &RequestContext,
    uid: &str,
) -> Result<LoginAttempt, AppError> {
    match state.auth.login(ctx.session(), uid).await {
        Ok(identity) => {
            track_login("success");
            info!(subject = %identity.subject(), "User signed in");
            Ok(LoginAttempt::SignedIn(identity))
        }
        Err(AuthError::NotFound) => {
            track_login("failure");
            let reason = if uid.trim().is_empty() {
                MISSING_UID_MESSAGE
            } else {
                UNKNOWN_UID_MESSAGE
            };
            Ok(LoginAttempt::Rejected(reason))
        }
        Err(e) => {
            track_login("fault");
            Err(ctx.fault(e))
        }
    }
}

/// Partial-update login: swaps the auth section in place.
#[instrument(skip_all)]
pub async fn htmx_login(
    State(state): State<AppState>,
    ctx: RequestContext,
    Form(form): Form<LoginForm>,
) -> Result<Html<String>, AppError> {
    match attempt_login(&state, &ctx, &form.uid).await? {
        LoginAttempt::SignedIn(identity) => {
            ctx.notify(Toast::new(format!("Welcome, {}!", identity.subject())).success());
            ctx.add_event(Phase::AfterSwap, AUTH_CHANGED_EVENT, true);
            Ok(Html(render::user_panel(&ctx, &identity)))
        }
        LoginAttempt::Rejected(reason) => {
            ctx.notify(Toast::new(reason).error());
            Ok(Html(render::login_form(&ctx)))
        }
    }
}

#[instrument(skip_all)]
pub async fn htmx_logout(State(state): State<AppState>, ctx: RequestContext) -> Response {
    state.auth.logout(ctx.session());
    ctx.flash().set(MessageLevel::Success, SIGNED_OUT_MESSAGE);
    ctx.redirect(&ctx.url("/"))
}
