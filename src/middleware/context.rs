use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{HeaderValue, StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use hagg_auth::Identity;
use hagg_core::{
    AppError, EventBus, Phase, Toast, TransportMode, errors::GENERIC_ERROR_MESSAGE,
    transport::HX_REDIRECT,
};
use hagg_session::{FlashStore, Session};
use parking_lot::Mutex;
use serde_json::Value;

use crate::state::AppState;

/// Typed request-scoped context.
///
/// Created once by the session pipeline and shared with guards and handlers
/// through request extensions. The transport mode is fixed at construction.
#[derive(Clone)]
pub struct RequestContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    transport: TransportMode,
    base_path: String,
    session: Session,
    events: Mutex<EventBus>,
    identity: Mutex<Option<Identity>>,
}

impl RequestContext {
    pub fn new(transport: TransportMode, base_path: impl Into<String>, session: Session) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                transport,
                base_path: base_path.into(),
                session,
                events: Mutex::new(EventBus::new()),
                identity: Mutex::new(None),
            }),
        }
    }

    pub fn transport(&self) -> TransportMode {
        self.inner.transport
    }

    pub fn is_partial(&self) -> bool {
        self.inner.transport.is_partial()
    }

    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    pub fn flash(&self) -> FlashStore {
        FlashStore::new(self.inner.session.clone())
    }

    /// Absolute path of `path` under the mount prefix.
    pub fn url(&self, path: &str) -> String {
        let base = self.inner.base_path.as_str();
        match (base, path) {
            ("", "") => "/".to_string(),
            ("", _) => path.to_string(),
            (_, "" | "/") => base.to_string(),
            _ => format!("{base}{path}"),
        }
    }

    pub fn add_event(&self, phase: Phase, name: impl Into<String>, payload: impl Into<Value>) {
        self.inner.events.lock().add(phase, name, payload);
    }

    pub fn notify(&self, toast: Toast) {
        toast.notify(&mut self.inner.events.lock());
    }

    /// Takes every buffered event, leaving the bus empty.
    pub fn take_events(&self) -> EventBus {
        std::mem::take(&mut *self.inner.events.lock())
    }

    /// Queues the generic error toast and wraps `err` as a `500`.
    pub fn fault<E>(&self, err: E) -> AppError
    where
        E: Into<anyhow::Error>,
    {
        self.notify(Toast::new(GENERIC_ERROR_MESSAGE).error());
        AppError::internal(err)
    }

    pub fn identity(&self) -> Option<Identity> {
        self.inner.identity.lock().clone()
    }

    pub fn set_identity(&self, identity: Identity) {
        *self.inner.identity.lock() = Some(identity);
    }

    /// Transport-aware redirect.
    ///
    /// Partial updates get `204` with an `HX-Redirect` directive so the client
    /// navigates itself; full-page loads get a `303 See Other`.
    pub fn redirect(&self, to: &str) -> Response {
        match self.inner.transport {
            TransportMode::PartialUpdate => match HeaderValue::from_str(to) {
                Ok(location) => {
                    (StatusCode::NO_CONTENT, [(HX_REDIRECT, location)]).into_response()
                }
                Err(_) => AppError::internal(anyhow::anyhow!("invalid redirect target: {to}"))
                    .into_response(),
            },
            TransportMode::FullPage => Redirect::to(to).into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or_else(|| AppError::internal(anyhow::anyhow!("request context missing")))
    }
}

/// The authenticated identity of the current request.
///
/// Guards cache the identity they resolved; on unguarded routes it is
/// resolved from the session on first use. Rejects with `401` when the
/// request is not authenticated.
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub Identity);

impl FromRequestParts<AppState> for CurrentIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ctx = RequestContext::from_request_parts(parts, state).await?;
        if let Some(identity) = ctx.identity() {
            return Ok(CurrentIdentity(identity));
        }

        let identity = state
            .auth
            .current_user(ctx.session())
            .await
            .ok_or_else(|| AppError::unauthorized(anyhow::anyhow!("Not authenticated")))?;
        ctx.set_identity(identity.clone());

        Ok(CurrentIdentity(identity))
    }
}
