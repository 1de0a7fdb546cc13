mod common;

use axum::http::{StatusCode, header};
use common::{
    TestApp, body_string, event_nodes, get_request, header_json, initial_events, session_cookie,
};
use hagg::hagg_auth::SESSION_KEY_UID;
use hagg::hagg_core::{Phase, TransportMode, transport::{HX_REDIRECT, HX_TRIGGER}};
use hagg::hagg_session::Session;
use hagg::middleware::context::RequestContext;
use hagg::middleware::guard::{GuardOutcome, check_auth, check_permission};

fn context_for(uid: Option<&str>) -> RequestContext {
    let session = Session::new();
    if let Some(uid) = uid {
        session.insert(SESSION_KEY_UID, uid);
    }
    RequestContext::new(TransportMode::FullPage, "", session)
}

#[tokio::test]
async fn test_permission_allowed_continues() {
    let app = TestApp::new();
    let ctx = context_for(Some("u-alice"));

    let outcome = check_permission(&app.state, &ctx, "dashboard:view").await;

    assert_eq!(outcome, GuardOutcome::Continue);
    assert_eq!(ctx.identity().unwrap().subject(), "alice");
    assert!(ctx.take_events().is_empty());
}

#[tokio::test]
async fn test_permission_denied_aborts_with_one_warning() {
    let app = TestApp::new();
    let ctx = context_for(Some("u-bob"));

    let outcome = check_permission(&app.state, &ctx, "dashboard:view").await;

    assert_eq!(outcome, GuardOutcome::Abort(StatusCode::FORBIDDEN));
    let bus = ctx.take_events();
    let events = bus.events(Phase::Immediate);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].payload["level"], "warning");
    assert!(bus.phase_is_empty(Phase::AfterSwap));
    assert!(bus.phase_is_empty(Phase::AfterSettle));
}

#[tokio::test]
async fn test_unauthenticated_redirects_without_consulting_enforcer() {
    let app = TestApp::new();
    let ctx = context_for(None);

    let outcome = check_permission(&app.state, &ctx, "dashboard:view").await;

    assert_eq!(outcome, GuardOutcome::RedirectTo("/".into()));
    assert_eq!(app.enforcer.calls(), 0);
    assert!(ctx.flash().has(hagg::hagg_core::MessageLevel::Warning));
}

#[tokio::test]
async fn test_unresolvable_identity_is_unauthenticated() {
    let app = TestApp::new();
    let ctx = context_for(Some("u-deleted"));

    assert_eq!(
        check_auth(&app.state, &ctx).await,
        GuardOutcome::RedirectTo("/".into())
    );
}

#[tokio::test]
async fn test_enforcer_fault_is_not_a_denial() {
    let app = TestApp::new();
    app.enforcer.set_fault(true);
    let ctx = context_for(Some("u-bob"));

    let outcome = check_permission(&app.state, &ctx, "dashboard:view").await;

    assert_eq!(outcome, GuardOutcome::Abort(StatusCode::INTERNAL_SERVER_ERROR));
    let events = ctx.take_events().events(Phase::Immediate);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].payload["level"], "error");
}

#[tokio::test]
async fn test_dashboard_for_permitted_user() {
    let app = TestApp::new();
    let cookie = app.login("u-alice").await;

    let response = app.send(get_request("/dashboard", Some(&cookie), false)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("<li>admin</li>"));
    assert!(body.contains("dashboard:view"));
}

#[tokio::test]
async fn test_dashboard_forbidden_full_page() {
    let app = TestApp::new();
    let cookie = app.login("u-bob").await;

    let response = app.send(get_request("/dashboard", Some(&cookie), false)).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(response.headers().get(HX_TRIGGER).is_none());

    let body = body_string(response).await;
    assert_eq!(event_nodes(&body), 1);
    let events = initial_events(&body);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["name"], "toast");
    assert_eq!(events[0]["payload"]["level"], "warning");
    assert_eq!(events[0]["payload"]["message"], "Permission denied.");
}

#[tokio::test]
async fn test_dashboard_forbidden_partial() {
    let app = TestApp::new();
    let cookie = app.login("u-bob").await;

    let response = app.send(get_request("/dashboard", Some(&cookie), true)).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let trigger = header_json(&response, HX_TRIGGER).unwrap();
    assert_eq!(trigger.as_object().unwrap().len(), 1);
    assert_eq!(trigger["toast"]["level"], "warning");
}

#[tokio::test]
async fn test_unauthenticated_full_page_redirect() {
    let app = TestApp::new();

    let response = app.send(get_request("/dashboard", None, false)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");
    assert_eq!(app.enforcer.calls(), 0);

    // the reason travels as a flash, shown on the login page
    let cookie = session_cookie(&response).unwrap();
    let response = app.send(get_request("/", Some(&cookie), false)).await;
    let events = initial_events(&body_string(response).await);
    assert_eq!(events[0]["payload"][0]["message"], "Unauthorized");
}

#[tokio::test]
async fn test_unauthenticated_partial_redirect_directive() {
    let app = TestApp::new();

    let response = app.send(get_request("/profile", None, true)).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(response.headers()[HX_REDIRECT], "/");
    assert!(response.headers().get(header::LOCATION).is_none());
}

#[tokio::test]
async fn test_enforcer_fault_returns_500() {
    let app = TestApp::new();
    let cookie = app.login("u-bob").await;
    app.enforcer.set_fault(true);

    let response = app.send(get_request("/dashboard", Some(&cookie), false)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_string(response).await;
    assert!(!body.contains("policy.csv"));
    assert!(!body.contains("Permission denied."));

    let events = initial_events(&body);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["payload"]["level"], "error");
    assert_eq!(
        events[0]["payload"]["message"],
        "Something went wrong. Please try again."
    );
}

#[tokio::test]
async fn test_handler_fault_full_page_renders_error_document() {
    let app = TestApp::new();
    let cookie = app.login("u-alice").await;
    app.enforcer.set_listing_fault(true);

    let response = app.send(get_request("/dashboard", Some(&cookie), false)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.headers().get(HX_TRIGGER).is_none());
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/html"));

    let body = body_string(response).await;
    assert!(!body.contains("role manager"));
    assert_eq!(event_nodes(&body), 1);
    let events = initial_events(&body);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["name"], "toast");
    assert_eq!(events[0]["payload"]["level"], "error");
}

#[tokio::test]
async fn test_handler_fault_partial_reports_through_headers() {
    let app = TestApp::new();
    let cookie = app.login("u-alice").await;
    app.enforcer.set_listing_fault(true);

    let response = app.send(get_request("/dashboard", Some(&cookie), true)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let trigger = header_json(&response, HX_TRIGGER).unwrap();
    assert_eq!(trigger["toast"]["level"], "error");
    assert_eq!(event_nodes(&body_string(response).await), 0);
}

#[tokio::test]
async fn test_redirect_honors_base_path() {
    let app = TestApp::with_base_path(Some("/app"));

    let response = app.send(get_request("/app/dashboard", None, false)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/app");
}

#[tokio::test]
async fn test_concurrent_guarded_requests() {
    let app = TestApp::new();
    let alice = app.login("u-alice").await;
    let bob = app.login("u-bob").await;

    let mut handles = Vec::new();
    for i in 0..32 {
        let (cookie, expected) = if i % 2 == 0 {
            (alice.clone(), StatusCode::OK)
        } else {
            (bob.clone(), StatusCode::FORBIDDEN)
        };
        let router = app.router.clone();
        handles.push(tokio::spawn(async move {
            use tower::ServiceExt;
            let response = router
                .oneshot(get_request("/dashboard", Some(&cookie), false))
                .await
                .unwrap();
            (response.status(), expected)
        }));
    }

    for handle in handles {
        let (status, expected) = handle.await.unwrap();
        assert_eq!(status, expected);
    }
    assert_eq!(app.enforcer.calls(), 32);
}
