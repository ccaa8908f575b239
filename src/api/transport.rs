use async_trait::async_trait;
use reqwest::{Method, StatusCode};

use crate::api::envelope::message_from_body;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::store::AppStore;

/// One backend call, before envelope handling.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path appended to the base URL, starting with `/`.
    pub path: String,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Sends requests and returns the raw JSON body of successful (2xx)
/// responses. Envelope handling happens above this layer.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<serde_json::Value, AppError>;
}

// ============================================================================
// HttpTransport
// ============================================================================

/// reqwest-backed transport. Attaches the bearer token from the auth slice
/// of the store on every request.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    store: AppStore,
}

impl HttpTransport {
    pub fn new(config: &AppConfig, store: AppStore) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.api_base(),
            store,
        })
    }

    /// Build a request to the given endpoint path, authenticated when a
    /// session token is present.
    fn authed(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let req = self.http.request(method, format!("{}{}", self.base_url, path));
        match self.store.token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<serde_json::Value, AppError> {
        let method = request.method.clone();
        let mut req = self.authed(request.method, &request.path);
        if let Some(ref body) = request.body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(|e| {
            tracing::warn!(method = %method, path = %request.path, error = %e, "Request failed");
            AppError::from(e)
        })?;
        let status = resp.status();
        let text = resp.text().await?;
        tracing::debug!(method = %method, path = %request.path, status = status.as_u16(), "Response");

        if status == StatusCode::UNAUTHORIZED {
            return Err(AppError::Auth(
                message_from_body(&text).unwrap_or_else(|| "Session expired or invalid".into()),
            ));
        }
        if !status.is_success() {
            let message = message_from_body(&text).unwrap_or_else(|| {
                status.canonical_reason().unwrap_or("Unexpected response").to_string()
            });
            return Err(AppError::Http {
                status: status.as_u16(),
                message,
            });
        }

        if text.trim().is_empty() {
            // 204-style answers carry no envelope.
            return Ok(serde_json::json!({ "success": true }));
        }
        serde_json::from_str(&text).map_err(AppError::from)
    }
}
