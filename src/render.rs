//! Server-rendered HTML.
//!
//! Pages are plain strings; the only moving part is the tiny client script
//! that replays committed events as DOM events, from the `HX-Trigger*`
//! headers (handled by htmx itself) or from the `initial-events` node on a
//! full-page load.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use hagg_auth::Identity;
use hagg_core::{Phase, Toast, errors::GENERIC_ERROR_MESSAGE, events::INITIAL_EVENTS_ID};
use serde_json::Value;

use crate::middleware::context::RequestContext;

/// Event carrying the flash messages drained while rendering a page.
pub const FLASH_EVENT: &str = "flash";

const CLIENT_SCRIPT: &str = r#"
document.addEventListener("DOMContentLoaded", function () {
  var node = document.getElementById("__ID__");
  if (!node) return;
  var events = JSON.parse(node.textContent || "[]");
  node.remove();
  events.forEach(function (e) {
    document.body.dispatchEvent(new CustomEvent(e.name, { detail: e.payload }));
  });
});
"#;

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn document(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="https://unpkg.com/htmx.org@2.0.4"></script>
<script>{script}</script>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape(title),
        script = CLIENT_SCRIPT.replace("__ID__", INITIAL_EVENTS_ID),
    )
}

/// Full page for `ctx`.
///
/// Drains the flash store so every pending flash is shown exactly once, as a
/// single `flash` event listing one toast per message.
pub fn page(ctx: &RequestContext, title: &str, body: &str) -> Html<String> {
    let flashes: Vec<Value> = ctx
        .flash()
        .pop_all()
        .into_iter()
        .map(|flash| Value::from(Toast::new(flash.message).level(flash.level)))
        .collect();
    if !flashes.is_empty() {
        ctx.add_event(Phase::Immediate, FLASH_EVENT, flashes);
    }

    let nav = format!(
        r#"<nav><a href="{home}">Home</a> <a href="{profile}">Profile</a> <a href="{dashboard}">Dashboard</a></nav>"#,
        home = ctx.url("/"),
        profile = ctx.url("/profile"),
        dashboard = ctx.url("/dashboard"),
    );

    Html(document(title, &format!("{nav}\n<main>\n{body}\n</main>")))
}

/// Bare status page; partial updates get an empty body since the client
/// only reads the trigger headers.
pub fn error_page(ctx: &RequestContext, status: StatusCode, message: &str) -> Response {
    if ctx.is_partial() {
        return status.into_response();
    }

    let body = format!(
        "<h1>{}</h1>\n<p>{}</p>",
        status.as_u16(),
        escape(message)
    );
    let title = status.canonical_reason().unwrap_or("Error");
    (status, Html(document(title, &body))).into_response()
}

pub fn internal_error_page(ctx: &RequestContext) -> Response {
    error_page(ctx, StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR_MESSAGE)
}

pub fn login_form(ctx: &RequestContext) -> String {
    format!(
        r##"<section id="auth">
<form method="post" action="{action}" hx-post="{hx_action}" hx-target="#auth" hx-swap="outerHTML">
<label for="uid">User id</label>
<input id="uid" name="uid" type="password" autocomplete="off">
<button type="submit">Sign in</button>
</form>
</section>"##,
        action = ctx.url("/"),
        hx_action = ctx.url("/htmx/login"),
    )
}

pub fn user_panel(ctx: &RequestContext, identity: &Identity) -> String {
    format!(
        r#"<section id="auth">
<p>Signed in as <strong>{name}</strong></p>
<form method="post" action="{logout}" hx-post="{logout}">
<button type="submit">Sign out</button>
</form>
</section>"#,
        name = escape(identity.subject()),
        logout = ctx.url("/htmx/logout"),
    )
}
