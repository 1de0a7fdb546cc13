//! Per-request session pipeline.
//!
//! Wraps every application route:
//!
//! 1. classify the request and load its session (`500` when the store fails)
//! 2. run guards and the handler inside a panic-catching boundary, and
//!    re-render any [`AppError`](hagg_core::AppError) for the request's transport
//! 3. persist the session if it changed (`500` when the store fails)
//! 4. commit buffered events as headers or as a markup node
//! 5. issue the session cookie when the session was written
//!
//! Guards that abort still return through this function, so session writes
//! they made (flash messages) are saved like any other.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use futures_util::FutureExt;
use hagg_core::{EventBus, ErrorReport, Toast, TransportMode, errors::GENERIC_ERROR_MESSAGE};
use hagg_session::Session;
use http_body_util::BodyExt;
use tracing::{debug, error, warn};

use crate::metrics::track_panic_recovered;
use crate::middleware::context::RequestContext;
use crate::render;
use crate::state::AppState;

pub async fn session_pipeline(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let transport = TransportMode::from_headers(req.headers());
    let cookie_value = jar.get(&state.cookie.name).map(|c| c.value().to_owned());

    let session = match state.sessions.load(cookie_value.as_deref()).await {
        Ok(session) => session,
        Err(e) => {
            error!(error = %e, "Session store failed to load session");
            let ctx = RequestContext::new(transport, state.base_path.clone(), Session::new());
            ctx.notify(Toast::new(GENERIC_ERROR_MESSAGE).error());
            let response = render::internal_error_page(&ctx);
            return commit_events(ctx.take_events(), transport, response).await;
        }
    };

    let ctx = RequestContext::new(transport, state.base_path.clone(), session);
    req.extensions_mut().insert(ctx.clone());

    let mut response = match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            error!(panic = %message, "Recovered from panic in request handler");
            track_panic_recovered();
            // events buffered before the panic describe work that did not finish
            let _ = ctx.take_events();
            ctx.notify(Toast::new(GENERIC_ERROR_MESSAGE).error());
            render::internal_error_page(&ctx)
        }
    };

    if let Some(report) = response.extensions().get::<ErrorReport>().cloned() {
        response = render::error_page(&ctx, report.status, &report.message);
    }

    let written = match state.sessions.save(ctx.session()).await {
        Ok(written) => written,
        Err(e) => {
            error!(error = %e, "Session store failed to save session");
            let _ = ctx.take_events();
            ctx.notify(Toast::new(GENERIC_ERROR_MESSAGE).error());
            response = render::internal_error_page(&ctx);
            false
        }
    };

    let mut response = commit_events(ctx.take_events(), transport, response).await;

    if written {
        match state.cookie.header_value(&ctx.session().id()) {
            Some(cookie) => {
                response.headers_mut().append(header::SET_COOKIE, cookie);
            }
            None => error!(
                cookie = %state.cookie.name,
                "Session cookie is not a valid header value"
            ),
        }
    }

    response
}

/// Encodes the request's events into the response.
///
/// Partial updates get one trigger header per non-empty phase. Full-page
/// HTML responses get a single `initial-events` node. Full-page responses
/// never carry trigger headers; one without a document (a redirect, a bare
/// status) has nowhere to put events, so they are logged and dropped.
pub async fn commit_events(
    bus: EventBus,
    transport: TransportMode,
    response: Response,
) -> Response {
    if bus.is_empty() {
        return response;
    }

    match transport {
        TransportMode::PartialUpdate => {
            let (mut parts, body) = response.into_parts();
            bus.write_headers(&mut parts.headers);
            Response::from_parts(parts, body)
        }
        TransportMode::FullPage if is_html(&response) => inject_markup(&bus, response).await,
        TransportMode::FullPage => {
            warn!(
                status = %response.status().as_u16(),
                "Dropping events: full-page response has no document"
            );
            response
        }
    }
}

fn is_html(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"))
}

async fn inject_markup(bus: &EventBus, response: Response) -> Response {
    let Some(markup) = bus.commit_markup() else {
        return response;
    };

    let (mut parts, body) = response.into_parts();
    let bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            error!(error = %e, "Failed to buffer response body for event injection");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let html = String::from_utf8_lossy(&bytes);
    let page = match html.rfind("</body>") {
        Some(at) => format!("{}{}{}", &html[..at], markup, &html[at..]),
        None => format!("{html}{markup}"),
    };
    debug!(bytes = page.len(), "Injected initial events");

    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(page))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
