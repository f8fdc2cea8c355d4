//! HTTP handlers of the mock backend

use axum::{
    body::Bytes,
    extract::{Path, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::debug;

use super::state::MockState;
use super::types::{AdminAccount, LoginRequest, MessageResponse, RecordedRequest, SignupRequest};
use crate::entities::EntityKind;
use crate::session::{AdminProfile, AdminRole, AuthSession};

/// Error responses, always `{"message": ...}`
#[derive(Debug)]
pub enum MockError {
    Unauthorized,
    Forbidden,
    NotFound(String),
    BadRequest(String),
    Conflict(String),
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            MockError::Unauthorized => (StatusCode::UNAUTHORIZED, "Not authorized".to_string()),
            MockError::Forbidden => (
                StatusCode::FORBIDDEN,
                "Only super admins can delete records".to_string(),
            ),
            MockError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            MockError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            MockError::Conflict(m) => (StatusCode::CONFLICT, m),
        };
        (status, Json(MessageResponse { message })).into_response()
    }
}

type MockResult<T> = Result<T, MockError>;

/// Log every request and hold GET responses back by any queued delay
pub async fn record_request(State(state): State<Arc<MockState>>, request: Request, next: Next) -> Response {
    let headers = request.headers();
    state.record_request(RecordedRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        accept_language: header_str(headers, header::ACCEPT_LANGUAGE),
        bearer: bearer(headers),
        body_lang: None,
    });

    let delay = if request.method() == axum::http::Method::GET {
        state.next_list_delay()
    } else {
        None
    };
    let path = request.uri().path().to_string();

    // the handler runs first so a delayed response carries the data as it was
    let response = next.run(request).await;
    if let Some(delay) = delay {
        debug!(?delay, path, "delaying response");
        tokio::time::sleep(delay).await;
    }
    response
}

/// POST /admin/login
pub async fn login(
    State(state): State<Arc<MockState>>,
    Json(req): Json<LoginRequest>,
) -> MockResult<Json<AuthSession>> {
    state.record_body_lang(req.lang);
    let (token, admin) = state
        .authenticate(&req.email, &req.password)
        .ok_or(MockError::Unauthorized)?;
    Ok(Json(AuthSession { token, admin }))
}

/// POST /admin/signup
///
/// The very first account becomes super admin; later ones are plain admins.
pub async fn signup(
    State(state): State<Arc<MockState>>,
    Json(req): Json<SignupRequest>,
) -> MockResult<(StatusCode, Json<AuthSession>)> {
    state.record_body_lang(req.lang.clone());
    if req.password != req.confirm_password {
        return Err(MockError::BadRequest("Passwords do not match".to_string()));
    }
    if state.has_account(&req.email) {
        return Err(MockError::Conflict("Email already registered".to_string()));
    }

    let role = if state.has_accounts() {
        AdminRole::Admin
    } else {
        AdminRole::SuperAdmin
    };
    state.add_account(AdminAccount {
        username: req.username.clone(),
        email: req.email.clone(),
        password: req.password,
        role: role.clone(),
    });
    let token = state.issue_token(&req.email);
    let admin = AdminProfile {
        username: req.username,
        email: req.email,
        role,
    };
    Ok((StatusCode::CREATED, Json(AuthSession { token, admin })))
}

/// GET /:kind
pub async fn list(
    State(state): State<Arc<MockState>>,
    Path(kind): Path<String>,
    headers: HeaderMap,
) -> MockResult<Json<Vec<Map<String, Value>>>> {
    let kind = parse_kind(&kind)?;
    require_admin(&state, &headers)?;
    Ok(Json(state.list(kind)))
}

/// GET /:kind/public
pub async fn list_public(
    State(state): State<Arc<MockState>>,
    Path(kind): Path<String>,
) -> MockResult<Json<Vec<Map<String, Value>>>> {
    let kind = parse_kind(&kind)?;
    Ok(Json(state.list_public(kind)))
}

/// GET /:kind/:id
pub async fn get_one(
    State(state): State<Arc<MockState>>,
    Path((kind, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> MockResult<Json<Map<String, Value>>> {
    let kind = parse_kind(&kind)?;
    require_admin(&state, &headers)?;
    state.get(kind, &id).map(Json).ok_or_else(|| not_found(kind))
}

/// POST /:kind
pub async fn create(
    State(state): State<Arc<MockState>>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> MockResult<(StatusCode, Json<Map<String, Value>>)> {
    let kind = parse_kind(&kind)?;
    require_admin(&state, &headers)?;
    let mut record = into_object(body)?;
    state.record_body_lang(body_lang(&record));
    record.remove("id");
    Ok((StatusCode::CREATED, Json(state.insert(kind, record))))
}

/// PUT /:kind/:id
pub async fn replace(
    State(state): State<Arc<MockState>>,
    Path((kind, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> MockResult<Json<Map<String, Value>>> {
    let kind = parse_kind(&kind)?;
    require_admin(&state, &headers)?;
    let record = into_object(body)?;
    state.record_body_lang(body_lang(&record));
    state
        .modify(kind, &id, |existing| *existing = record)
        .map(Json)
        .ok_or_else(|| not_found(kind))
}

/// PATCH /:kind/:id
pub async fn patch(
    State(state): State<Arc<MockState>>,
    Path((kind, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> MockResult<Json<Map<String, Value>>> {
    let kind = parse_kind(&kind)?;
    require_admin(&state, &headers)?;
    let changes = into_object(body)?;
    state.record_body_lang(body_lang(&changes));
    state
        .modify(kind, &id, |existing| existing.extend(changes))
        .map(Json)
        .ok_or_else(|| not_found(kind))
}

/// DELETE /:kind/:id, super admins only
pub async fn remove(
    State(state): State<Arc<MockState>>,
    Path((kind, id)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> MockResult<Json<MessageResponse>> {
    let kind = parse_kind(&kind)?;
    let admin = require_admin(&state, &headers)?;
    if let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(&body) {
        state.record_body_lang(body_lang(&map));
    }
    if admin.role != AdminRole::SuperAdmin {
        return Err(MockError::Forbidden);
    }
    if !state.delete(kind, &id) {
        return Err(not_found(kind));
    }
    Ok(Json(MessageResponse {
        message: format!("{} deleted", kind.singular()),
    }))
}

/// Fallback for unknown routes
pub async fn not_found_route() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "message": "Route not found" })))
}

fn require_admin(state: &MockState, headers: &HeaderMap) -> MockResult<AdminProfile> {
    let token = bearer(headers).ok_or(MockError::Unauthorized)?;
    state.admin_for_token(&token).ok_or(MockError::Unauthorized)
}

fn parse_kind(raw: &str) -> MockResult<EntityKind> {
    raw.parse()
        .map_err(|_| MockError::NotFound(format!("Unknown collection '{raw}'")))
}

fn not_found(kind: EntityKind) -> MockError {
    MockError::NotFound(format!("{} not found", kind.singular()))
}

fn into_object(body: Value) -> MockResult<Map<String, Value>> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(MockError::BadRequest("Expected a JSON object".to_string())),
    }
}

fn body_lang(body: &Map<String, Value>) -> Option<String> {
    body.get("lang").and_then(Value::as_str).map(str::to_string)
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    header_str(headers, header::AUTHORIZATION)?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}
