//! Route-level checks of the mock backend, without a socket

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use corpsite_core::entities::EntityKind;
use corpsite_core::session::AdminRole;
use corpsite_core::test_harness::{build_router, MockState};
use corpsite_core::test_utils::{project_json, EDITOR_EMAIL, SUPER_ADMIN_EMAIL, TEST_PASSWORD};
use corpsite_core::test_harness::types::AdminAccount;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn state() -> Arc<MockState> {
    let state = MockState::with_admin("root", SUPER_ADMIN_EMAIL, TEST_PASSWORD, AdminRole::SuperAdmin);
    state.add_account(AdminAccount {
        username: "editor".to_string(),
        email: EDITOR_EMAIL.to_string(),
        password: TEST_PASSWORD.to_string(),
        role: AdminRole::Editor,
    });
    state.seed(
        EntityKind::Projects,
        [project_json("Visible", true), project_json("Hidden", false)],
    );
    Arc::new(state)
}

async fn call(router: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::ACCEPT_LANGUAGE, "en");
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn token(state: &MockState, email: &str) -> String {
    state.authenticate(email, TEST_PASSWORD).unwrap().0
}

#[tokio::test]
async fn test_public_route_filters_hidden_records() {
    let router = build_router(state());
    let (status, body) = call(&router, Method::GET, "/api/projects/public", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "Visible");
}

#[tokio::test]
async fn test_admin_routes_need_a_token() {
    let state = state();
    let router = build_router(state.clone());

    let (status, body) = call(&router, Method::GET, "/api/projects", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].is_string());

    let token = token(&state, SUPER_ADMIN_EMAIL);
    let (status, body) = call(&router, Method::GET, "/api/projects", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_delete_is_super_admin_only() {
    let state = state();
    let router = build_router(state.clone());

    let editor = token(&state, EDITOR_EMAIL);
    let (status, _) = call(&router, Method::DELETE, "/api/projects/1", Some(&editor), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(state.list(EntityKind::Projects).len(), 2);

    let root = token(&state, SUPER_ADMIN_EMAIL);
    let (status, _) = call(
        &router,
        Method::DELETE,
        "/api/projects/1",
        Some(&root),
        Some(json!({"lang": "ar"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.list(EntityKind::Projects).len(), 1);
    assert_eq!(state.last_request().unwrap().body_lang.as_deref(), Some("ar"));
}

#[tokio::test]
async fn test_concurrent_creates_get_distinct_ids() {
    let state = state();
    let router = build_router(state.clone());
    let token = token(&state, SUPER_ADMIN_EMAIL);

    let creates = (0..8).map(|n| {
        call(
            &router,
            Method::POST,
            "/api/awards",
            Some(&token),
            Some(json!({"title": format!("Award {n}"), "lang": "en"})),
        )
    });
    let results = futures::future::join_all(creates).await;

    let mut ids: Vec<i64> = results
        .iter()
        .map(|(status, body)| {
            assert_eq!(*status, StatusCode::CREATED);
            body["id"].as_i64().unwrap()
        })
        .collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 8);
}

#[tokio::test]
async fn test_unknown_collection_and_route() {
    let router = build_router(state());
    let (status, _) = call(&router, Method::GET, "/api/blog/public", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&router, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
