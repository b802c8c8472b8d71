use crate::session::Session;
use crate::util::{validate_base_url, UrlValidationError};
use futures::StreamExt;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const MAX_RESPONSE_SIZE: usize = 5 * 1024 * 1024; // 5MB

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Session expired or invalid, log in again")]
    Unauthorized,
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("Server reported an unsuccessful response")]
    Unsuccessful,
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Invalid UTF-8 in response")]
    InvalidUtf8,
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("Insecure base URL: HTTPS required (except localhost for testing)")]
    InsecureBaseUrl,
    #[error("Not logged in")]
    NotAuthenticated,
}

impl ApiError {
    /// True when the stored token should be discarded.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized | ApiError::NotAuthenticated)
    }
}

impl From<UrlValidationError> for ApiError {
    fn from(err: UrlValidationError) -> Self {
        match err {
            UrlValidationError::Insecure => ApiError::InsecureBaseUrl,
            other => ApiError::InvalidBaseUrl(other.to_string()),
        }
    }
}

/// Typed client for the CMS REST API.
///
/// Cheap to clone; clones share the underlying connection pool. Calls that
/// need authentication take the [`Session`] explicitly.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ApiError> {
        let base = validate_base_url(base_url)?;
        if base.scheme() == "http" {
            tracing::warn!(base_url = %base, "Using non-HTTPS API base URL (localhost only)");
        }

        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(5))
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base,
            timeout: Duration::from_secs(timeout_secs.max(1)),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidBaseUrl(e.to_string()))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        session: Option<&Session>,
    ) -> Result<T, ApiError> {
        let request = self.http.get(self.endpoint(path)?);
        let body = self.send(request, session).await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        session: Option<&Session>,
    ) -> Result<T, ApiError> {
        let request = self.http.post(self.endpoint(path)?).json(body);
        let text = self.send(request, session).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// POST whose response body is not needed beyond an optional
    /// `success: false` check.
    pub(crate) async fn post_unit<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        session: Option<&Session>,
    ) -> Result<(), ApiError> {
        let request = self.http.post(self.endpoint(path)?).json(body);
        let text = self.send(request, session).await?;
        check_success_flag(&text)
    }

    /// POST with no request body.
    pub(crate) async fn post_empty(
        &self,
        path: &str,
        session: Option<&Session>,
    ) -> Result<(), ApiError> {
        let request = self.http.post(self.endpoint(path)?);
        let text = self.send(request, session).await?;
        check_success_flag(&text)
    }

    async fn send(
        &self,
        mut request: reqwest::RequestBuilder,
        session: Option<&Session>,
    ) -> Result<String, ApiError> {
        request = request.header(reqwest::header::ACCEPT, "application/json");
        if let Some(session) = session {
            request = request.bearer_auth(session.token().expose_secret());
        }

        let response = tokio::time::timeout(self.timeout, request.send())
            .await
            .map_err(|_| ApiError::Timeout(self.timeout.as_secs()))?
            .map_err(ApiError::Network)?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            // Validation failures carry a human-readable message
            let body = read_limited_text(response, MAX_RESPONSE_SIZE)
                .await
                .unwrap_or_default();
            return Err(match error_message(&body) {
                Some(message) if status.is_client_error() => ApiError::Rejected {
                    status: status.as_u16(),
                    message,
                },
                _ => ApiError::HttpStatus(status.as_u16()),
            });
        }

        read_limited_text(response, MAX_RESPONSE_SIZE).await
    }
}

/// Pull `message`, or the first entry of `errors`, out of an error body.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    if let Some(errors) = value.get("errors").and_then(|e| e.as_object()) {
        let first = errors.values().find_map(|v| match v {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Array(items) => items.first()?.as_str().map(str::to_string),
            _ => None,
        });
        if first.is_some() {
            return first;
        }
    }

    value
        .get("message")
        .and_then(|m| m.as_str())
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// An explicit `"success": false` fails the call; any other body passes.
fn check_success_flag(body: &str) -> Result<(), ApiError> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return Ok(());
    };
    match value.get("success").and_then(|s| s.as_bool()) {
        Some(false) => Err(ApiError::Unsuccessful),
        _ => Ok(()),
    }
}

pub(crate) fn ensure_success(success: bool) -> Result<(), ApiError> {
    if success {
        Ok(())
    } else {
        Err(ApiError::Unsuccessful)
    }
}

async fn read_limited_text(response: reqwest::Response, limit: usize) -> Result<String, ApiError> {
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(ApiError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    String::from_utf8(bytes).map_err(|_| ApiError::InvalidUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(&format!("{}/api/", server.uri()), 5).unwrap()
    }

    #[test]
    fn test_insecure_base_url_rejected() {
        let result = ApiClient::new("http://cms.example.com/api/", 5);
        assert!(matches!(result, Err(ApiError::InsecureBaseUrl)));
    }

    #[test]
    fn test_https_and_localhost_base_urls_allowed() {
        assert!(ApiClient::new("https://cms.example.com/api/", 5).is_ok());
        assert!(ApiClient::new("http://localhost:8000/api/", 5).is_ok());
        assert!(ApiClient::new("http://127.0.0.1:8000/api", 5).is_ok());
    }

    #[test]
    fn test_endpoint_joins_onto_base_path() {
        let client = ApiClient::new("https://cms.example.com/api", 5).unwrap();
        let url = client.endpoint("home/menu-items").unwrap();
        assert_eq!(url.as_str(), "https://cms.example.com/api/home/menu-items");
    }

    #[tokio::test]
    async fn test_bearer_and_accept_headers_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/user"))
            .and(header("authorization", "Bearer secret-token"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
            .expect(1)
            .mount(&server)
            .await;

        let session = Session::new(SecretString::from("secret-token"));
        let value: serde_json::Value = client_for(&server)
            .get_json("user", Some(&session))
            .await
            .unwrap();
        assert_eq!(value["ok"], serde_json::json!(true));
    }

    #[tokio::test]
    async fn test_401_maps_to_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let result: Result<serde_json::Value, _> = client_for(&server).get_json("user", None).await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_validation_message_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422).set_body_string(
                r#"{"message":"The given data was invalid.","errors":{"email":["The email field is required."]}}"#,
            ))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .post_unit("login", &serde_json::json!({}), None)
            .await;
        match result {
            Err(ApiError::Rejected { status, message }) => {
                assert_eq!(status, 422);
                assert_eq!(message, "The email field is required.");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_maps_to_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string(r#"{"message":"boom"}"#))
            .mount(&server)
            .await;

        let result: Result<serde_json::Value, _> = client_for(&server).get_json("x", None).await;
        assert!(matches!(result, Err(ApiError::HttpStatus(500))));
    }

    #[tokio::test]
    async fn test_success_false_is_unsuccessful() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"success":false}"#))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .post_unit("admin/posts/leadnews", &serde_json::json!({"news_id": 1}), None)
            .await;
        assert!(matches!(result, Err(ApiError::Unsuccessful)));
    }

    #[tokio::test]
    async fn test_oversized_response_rejected() {
        let server = MockServer::start().await;
        let body = "x".repeat(MAX_RESPONSE_SIZE + 1);
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let result: Result<serde_json::Value, _> = client_for(&server).get_json("big", None).await;
        assert!(matches!(result, Err(ApiError::ResponseTooLarge(_))));
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("{}")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(&format!("{}/api/", server.uri()), 1).unwrap();
        let result: Result<serde_json::Value, _> = client.get_json("slow", None).await;
        assert!(matches!(result, Err(ApiError::Timeout(1))));
    }

    #[test]
    fn test_error_message_prefers_field_errors() {
        assert_eq!(
            error_message(r#"{"message":"m","errors":{"password":["too short"]}}"#),
            Some("too short".to_string())
        );
        assert_eq!(error_message(r#"{"message":"Invalid credentials"}"#), Some("Invalid credentials".to_string()));
        assert_eq!(error_message("not json"), None);
    }
}
