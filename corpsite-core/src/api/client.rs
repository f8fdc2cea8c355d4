//! REST client
//!
//! Single chokepoint for outbound calls. Every request carries
//! `Accept-Language`; body-bearing requests also embed `lang`; a bearer token
//! is attached whenever a session exists. A 401 ends the session and sends the
//! operator back to the login page. There is no retry, timeout or request
//! deduplication: each call is fire-once and failures go straight back to the
//! caller.

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn, Instrument};

use super::error::{ApiError, ApiResult};
use crate::config::ApiConfig;
use crate::i18n::{Language, LanguageContext};
use crate::metrics::{self, MetricsSnapshot, RequestMetrics, Timer};
use crate::navigation::Navigator;
use crate::session::SessionStore;

/// Authenticated, language-tagged JSON client for the CMS backend
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<SessionStore>,
    language: Arc<LanguageContext>,
    navigator: Arc<Navigator>,
    metrics: RequestMetrics,
}

impl ApiClient {
    pub fn new(
        config: &ApiConfig,
        session: Arc<SessionStore>,
        language: Arc<LanguageContext>,
        navigator: Arc<Navigator>,
    ) -> ApiResult<Self> {
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base().to_string(),
            session,
            language,
            navigator,
            metrics: RequestMetrics::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn language(&self) -> &Arc<LanguageContext> {
        &self.language
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub(crate) fn record_stale_discard(&self) {
        self.metrics.inc_stale_discarded();
        metrics::record_counter(metrics::STORE_STALE_DISCARDED, 1);
    }

    /// Absolute URL for an endpoint path
    pub fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Issue one request and decode the JSON response
    ///
    /// `lang` overrides the ambient language for the `Accept-Language` header.
    /// The body is sent as given; use the verb helpers to get `lang` injected.
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
        lang: Option<Language>,
    ) -> ApiResult<Value> {
        let lang = lang.unwrap_or_else(|| self.language.language());
        let span = tracing::debug_span!("api.request", %method, endpoint, lang = lang.code());
        self.send(method, endpoint, body, lang).instrument(span).await
    }

    async fn send(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
        lang: Language,
    ) -> ApiResult<Value> {
        let url = reqwest::Url::parse(&self.url(endpoint))
            .map_err(|e| ApiError::InvalidUrl(format!("{endpoint}: {e}")))?;
        let mut request = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(ACCEPT_LANGUAGE, lang.code());

        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        self.metrics.inc_requests();
        metrics::record_counter(metrics::API_REQUESTS_TOTAL, 1);
        let timer = Timer::new(metrics::API_REQUEST_DURATION_MS);

        let outcome = self.exchange(request).await;
        let elapsed_ms = timer.stop();

        match &outcome {
            Ok(_) => debug!(elapsed_ms, "request succeeded"),
            Err(e) => {
                self.metrics.inc_failures();
                metrics::record_counter(metrics::API_REQUESTS_FAILED, 1);
                warn!(error = %e, elapsed_ms, "request failed");
            }
        }
        outcome
    }

    async fn exchange(&self, request: reqwest::RequestBuilder) -> ApiResult<Value> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.expire_session();
            return Err(ApiError::Authentication);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                message: error_message(&bytes),
            });
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn expire_session(&self) {
        self.metrics.inc_auth_expired();
        metrics::record_counter(metrics::API_AUTH_EXPIRED, 1);
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "could not remove expired session record");
        }
        self.navigator.redirect_to_login();
        warn!("session rejected by backend, redirected to login");
    }

    pub async fn get(&self, endpoint: &str) -> ApiResult<Value> {
        self.request(Method::GET, endpoint, None, None).await
    }

    pub async fn post(&self, endpoint: &str, data: Value) -> ApiResult<Value> {
        self.post_with_lang(endpoint, data, self.language.language())
            .await
    }

    pub async fn put(&self, endpoint: &str, data: Value) -> ApiResult<Value> {
        self.put_with_lang(endpoint, data, self.language.language())
            .await
    }

    pub async fn patch(&self, endpoint: &str, data: Value) -> ApiResult<Value> {
        self.patch_with_lang(endpoint, data, self.language.language())
            .await
    }

    /// Plain delete without a body
    pub async fn delete(&self, endpoint: &str) -> ApiResult<Value> {
        self.request(Method::DELETE, endpoint, None, None).await
    }

    pub async fn post_with_lang(&self, endpoint: &str, data: Value, lang: Language) -> ApiResult<Value> {
        let body = tag_payload(data, lang)?;
        self.request(Method::POST, endpoint, Some(body), Some(lang))
            .await
    }

    pub async fn put_with_lang(&self, endpoint: &str, data: Value, lang: Language) -> ApiResult<Value> {
        let body = tag_payload(data, lang)?;
        self.request(Method::PUT, endpoint, Some(body), Some(lang))
            .await
    }

    pub async fn patch_with_lang(&self, endpoint: &str, data: Value, lang: Language) -> ApiResult<Value> {
        let body = tag_payload(data, lang)?;
        self.request(Method::PATCH, endpoint, Some(body), Some(lang))
            .await
    }

    /// Delete that tells the backend which locale's content to drop
    pub async fn delete_with_lang(&self, endpoint: &str, lang: Language) -> ApiResult<Value> {
        let body = tag_payload(Value::Null, lang)?;
        self.request(Method::DELETE, endpoint, Some(body), Some(lang))
            .await
    }

    /// `get` decoded into a concrete type
    pub async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<T> {
        decode(self.get(endpoint).await?)
    }

    /// `post_with_lang` with typed request and response bodies
    pub async fn post_json<B, T>(&self, endpoint: &str, data: &B, lang: Language) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let data = serde_json::to_value(data).map_err(|e| ApiError::InvalidPayload(e.to_string()))?;
        decode(self.post_with_lang(endpoint, data, lang).await?)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// `{...data, lang}`
///
/// `null` becomes `{lang}`; anything other than an object is rejected before
/// any I/O happens. An existing `lang` key is overwritten.
pub fn tag_payload(data: Value, lang: Language) -> ApiResult<Value> {
    let mut object = match data {
        Value::Object(map) => map,
        Value::Null => serde_json::Map::new(),
        other => {
            return Err(ApiError::InvalidPayload(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            )))
        }
    };
    object.insert("lang".to_string(), Value::String(lang.code().to_string()));
    Ok(Value::Object(object))
}

pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> ApiResult<T> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Pull `message` or `error` out of an error body, if it is JSON
fn error_message(bytes: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(bytes).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::to_string)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tag_payload_merges_lang() {
        let tagged = tag_payload(json!({"title": "Tower"}), Language::Ar).unwrap();
        assert_eq!(tagged, json!({"title": "Tower", "lang": "ar"}));
    }

    #[test]
    fn test_tag_payload_overrides_stale_lang() {
        let tagged = tag_payload(json!({"lang": "en"}), Language::Ar).unwrap();
        assert_eq!(tagged["lang"], "ar");
    }

    #[test]
    fn test_tag_payload_null_and_rejects() {
        assert_eq!(tag_payload(Value::Null, Language::En).unwrap(), json!({"lang": "en"}));
        assert!(matches!(
            tag_payload(json!([1, 2]), Language::En),
            Err(ApiError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(br#"{"message":"Not allowed"}"#).as_deref(),
            Some("Not allowed")
        );
        assert_eq!(
            error_message(br#"{"error":"Bad id"}"#).as_deref(),
            Some("Bad id")
        );
        assert_eq!(error_message(b"<html>oops</html>"), None);
    }

    #[tokio::test]
    async fn test_malformed_url_fails_before_sending() {
        let config = ApiConfig {
            base_url: "http://[::1".to_string(),
            ..Default::default()
        };
        let storage: Arc<dyn crate::storage::ClientStorage> = Arc::new(crate::storage::MemoryStorage::new());
        let client = ApiClient::new(
            &config,
            Arc::new(SessionStore::load(storage.clone())),
            Arc::new(LanguageContext::init(storage, Language::En)),
            Arc::new(Navigator::default()),
        )
        .unwrap();

        let err = client.get("/projects").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
        assert_eq!(client.metrics().requests, 0);
    }
}
