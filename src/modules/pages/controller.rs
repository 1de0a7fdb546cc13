use axum::{
    Form,
    extract::State,
    response::{Html, Response},
};
use hagg_core::{AppError, MessageLevel};
use tracing::instrument;

use crate::middleware::context::{CurrentIdentity, RequestContext};
use crate::modules::auth::{
    LoginForm,
    controller::{LoginAttempt, attempt_login},
};
use crate::render::{self, escape};
use crate::state::AppState;

#[instrument(skip_all)]
pub async fn home(State(state): State<AppState>, ctx: RequestContext) -> Html<String> {
    let section = match state.auth.current_user(ctx.session()).await {
        Some(identity) => render::user_panel(&ctx, &identity),
        None => render::login_form(&ctx),
    };

    render::page(&ctx, "Home", &format!("<h1>Welcome</h1>\n{section}"))
}

/// Plain form post for clients without the partial-update layer.
#[instrument(skip_all)]
pub async fn home_login(
    State(state): State<AppState>,
    ctx: RequestContext,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    match attempt_login(&state, &ctx, &form.uid).await? {
        LoginAttempt::SignedIn(identity) => ctx.flash().set(
            MessageLevel::Success,
            format!("Welcome, {}!", identity.subject()),
        ),
        LoginAttempt::Rejected(reason) => ctx.flash().set(MessageLevel::Error, reason),
    }

    Ok(ctx.redirect(&ctx.url("/")))
}

#[instrument(skip_all)]
pub async fn profile(
    ctx: RequestContext,
    CurrentIdentity(identity): CurrentIdentity,
) -> Html<String> {
    let user = identity.user();
    let full_name = match user.full_name() {
        name if name.is_empty() => "-".to_string(),
        name => escape(&name),
    };
    let body = format!(
        "<h1>Profile</h1>\n<dl>\n\
         <dt>Name</dt><dd>{name}</dd>\n\
         <dt>Full name</dt><dd>{full_name}</dd>\n\
         <dt>Member since</dt><dd>{since}</dd>\n</dl>",
        name = escape(identity.subject()),
        since = user.created_at.format("%Y-%m-%d"),
    );

    render::page(&ctx, "Profile", &body)
}

/// Lists what the policy engine grants the signed-in subject.
#[instrument(skip_all)]
pub async fn dashboard(
    State(state): State<AppState>,
    ctx: RequestContext,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<Html<String>, AppError> {
    let subject = identity.subject();
    let roles = state
        .permissions
        .roles_for(subject)
        .await
        .map_err(|e| ctx.fault(e))?;
    let permissions = state
        .permissions
        .permissions_for(subject)
        .await
        .map_err(|e| ctx.fault(e))?;

    let roles = list(roles.iter().map(|role| escape(role)));
    let permissions = list(permissions.iter().map(|[granted_to, action]| {
        format!(
            "{} <small>via {}</small>",
            escape(action),
            escape(granted_to)
        )
    }));

    let body = format!(
        "<h1>Dashboard</h1>\n<h2>Roles</h2>\n{roles}\n<h2>Permissions</h2>\n{permissions}"
    );
    Ok(render::page(&ctx, "Dashboard", &body))
}

fn list(items: impl Iterator<Item = String>) -> String {
    let items: Vec<String> = items.map(|item| format!("<li>{item}</li>")).collect();
    if items.is_empty() {
        return "<p>None</p>".to_string();
    }
    format!("<ul>\n{}\n</ul>", items.join("\n"))
}
