#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
    routing::get,
};
use hagg::hagg_auth::{Enforcer, EnforcerError};
use hagg::hagg_config::AppConfig;
use hagg::hagg_core::{Phase, Toast, transport::HX_REQUEST};
use hagg::hagg_db::MemoryUserStore;
use hagg::hagg_session::{
    MemorySessionStore, SessionError, SessionId, SessionRecord, SessionStore,
};
use hagg::middleware::context::RequestContext;
use hagg::modules::{auth::init_auth_router, pages::init_pages_router};
use hagg::router::with_pipeline;
use hagg::state::AppState;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub const COOKIE_NAME: &str = "hagg_session";

/// Scripted policy engine with call counting and fault injection.
#[derive(Default)]
pub struct FakeEnforcer {
    grants: HashSet<(String, String)>,
    roles: HashMap<String, Vec<String>>,
    fault: AtomicBool,
    listing_fault: AtomicBool,
    calls: AtomicUsize,
}

impl FakeEnforcer {
    pub fn new() -> Self {
        Self::default()
            .allow("alice", "dashboard:view")
            .role("alice", "admin")
    }

    pub fn allow(mut self, subject: &str, action: &str) -> Self {
        self.grants.insert((subject.to_string(), action.to_string()));
        self
    }

    pub fn role(mut self, subject: &str, role: &str) -> Self {
        self.roles
            .entry(subject.to_string())
            .or_default()
            .push(role.to_string());
        self
    }

    pub fn set_fault(&self, fault: bool) {
        self.fault.store(fault, Ordering::SeqCst);
    }

    /// Fails role and permission listings while checks keep working.
    pub fn set_listing_fault(&self, fault: bool) {
        self.listing_fault.store(fault, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fault_check(&self) -> Result<(), EnforcerError> {
        if self.fault.load(Ordering::SeqCst) {
            return Err(EnforcerError::Policy(
                "policy.csv: line 3: unexpected token".into(),
            ));
        }
        Ok(())
    }

    fn listing_check(&self) -> Result<(), EnforcerError> {
        self.fault_check()?;
        if self.listing_fault.load(Ordering::SeqCst) {
            return Err(EnforcerError::Engine("role manager unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Enforcer for FakeEnforcer {
    async fn enforce(&self, subject: &str, action: &str) -> Result<bool, EnforcerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.fault_check()?;
        Ok(self
            .grants
            .contains(&(subject.to_string(), action.to_string())))
    }

    async fn roles_for(&self, subject: &str) -> Result<Vec<String>, EnforcerError> {
        self.listing_check()?;
        Ok(self.roles.get(subject).cloned().unwrap_or_default())
    }

    async fn permissions_for(&self, subject: &str) -> Result<Vec<[String; 2]>, EnforcerError> {
        self.listing_check()?;
        Ok(self
            .grants
            .iter()
            .filter(|(s, _)| s == subject)
            .map(|(s, a)| [s.clone(), a.clone()])
            .collect())
    }
}

/// Memory session store whose reads and writes can be made to fail.
#[derive(Debug, Default)]
pub struct FlakySessionStore {
    inner: MemorySessionStore,
    fail_load: AtomicBool,
    fail_save: AtomicBool,
}

impl FlakySessionStore {
    pub fn set_fail_load(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_save(&self, fail: bool) {
        self.fail_save.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub async fn record(&self, cookie: &str) -> Option<SessionRecord> {
        let id = SessionId::parse(cookie.split_once('=')?.1)?;
        self.inner.load(&id).await.ok().flatten()
    }
}

#[async_trait]
impl SessionStore for FlakySessionStore {
    async fn load(&self, id: &SessionId) -> Result<Option<SessionRecord>, SessionError> {
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(SessionError::Backend("connection reset by peer".into()));
        }
        self.inner.load(id).await
    }

    async fn save(
        &self,
        id: &SessionId,
        record: &SessionRecord,
        ttl: Duration,
    ) -> Result<(), SessionError> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(SessionError::Backend("connection reset by peer".into()));
        }
        self.inner.save(id, record, ttl).await
    }

    async fn delete(&self, id: &SessionId) -> Result<(), SessionError> {
        self.inner.delete(id).await
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub enforcer: Arc<FakeEnforcer>,
    pub sessions: Arc<FlakySessionStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_base_path(None)
    }

    pub fn with_base_path(base_path: Option<&str>) -> Self {
        let base_path = base_path.map(str::to_string);
        let config = AppConfig::from_lookup(move |key: &str| match key {
            "BASE_PATH" => base_path.clone(),
            _ => None,
        })
        .unwrap();

        let enforcer = Arc::new(FakeEnforcer::new());
        let sessions = Arc::new(FlakySessionStore::default());
        let users = Arc::new(MemoryUserStore::with_users([
            ("u-alice", "alice"),
            ("u-bob", "bob"),
        ]));

        let state = AppState::new(&config, users, sessions.clone(), enforcer.clone());
        let routes = Router::new()
            .merge(init_pages_router(state.clone()))
            .nest("/htmx", init_auth_router())
            .merge(test_routes());

        Self {
            router: with_pipeline(state.clone(), routes),
            state,
            enforcer,
            sessions,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Logs in through the partial-update endpoint and returns the cookie pair.
    pub async fn login(&self, uid: &str) -> String {
        let response = self
            .send(post_form("/htmx/login", &format!("uid={uid}"), None, true))
            .await;
        session_cookie(&response).expect("login should issue a session cookie")
    }
}

// Routes that exercise the pipeline directly.
fn test_routes() -> Router<AppState> {
    Router::new()
        .route("/test/boom", get(boom))
        .route("/test/events", get(events))
}

async fn boom(ctx: RequestContext) -> &'static str {
    ctx.session().insert("touched", true);
    ctx.notify(Toast::new("never delivered").success());
    panic!("handler exploded");
}

async fn events(ctx: RequestContext) -> axum::response::Html<String> {
    ctx.notify(Toast::new("Grüße").info());
    ctx.add_event(Phase::AfterSwap, "swapped", 1);
    ctx.add_event(Phase::AfterSettle, "settled", serde_json::json!({"done": true}));
    axum::response::Html("<html><body><p>events</p></body></html>".to_string())
}

pub fn get_request(uri: &str, cookie: Option<&str>, partial: bool) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    if partial {
        builder = builder.header(HX_REQUEST, "true");
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, form: &str, cookie: Option<&str>, partial: bool) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    if partial {
        builder = builder.header(HX_REQUEST, "true");
    }
    builder.body(Body::from(form.to_string())).unwrap()
}

/// `name=value` of the session cookie set by the response, if any.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(COOKIE_NAME))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub fn header_json(response: &Response<Body>, name: &str) -> Option<Value> {
    let raw = response.headers().get(name)?.to_str().ok()?;
    serde_json::from_str(raw).ok()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

const EVENTS_NODE: &str = r#"<script type="application/json" id="initial-events">"#;

pub fn event_nodes(body: &str) -> usize {
    body.matches(EVENTS_NODE).count()
}

/// Events carried by the page's `initial-events` node, in commit order.
pub fn initial_events(body: &str) -> Vec<Value> {
    let Some(start) = body.find(EVENTS_NODE) else {
        return Vec::new();
    };
    let rest = &body[start + EVENTS_NODE.len()..];
    let end = rest.find("</script>").unwrap();
    match serde_json::from_str(&rest[..end]).unwrap() {
        Value::Array(events) => events,
        other => panic!("initial events are not a list: {other}"),
    }
}
