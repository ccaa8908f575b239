use std::time::Duration;

use url::Url;

use crate::error::AppError;

pub const ENV_API_URL: &str = "CONSORCIO_API_URL";
pub const ENV_BASE_PATH: &str = "CONSORCIO_BASE_PATH";
pub const ENV_REQUEST_TIMEOUT: &str = "CONSORCIO_REQUEST_TIMEOUT_SECS";
pub const ENV_STALE_TIME: &str = "CONSORCIO_STALE_TIME_SECS";
pub const ENV_KEYRING_SERVICE: &str = "CONSORCIO_KEYRING_SERVICE";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_STALE_SECS: u64 = 60;
const DEFAULT_KEYRING_SERVICE: &str = "consorcio-admin";

/// Runtime configuration, resolved from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Backend base URL. Endpoint paths are appended verbatim.
    pub api_url: Url,
    /// Router base path of the dashboard, always starting and ending with `/`.
    pub base_path: String,
    pub request_timeout: Duration,
    /// How long a successful read is served from cache without refetching.
    pub stale_time: Duration,
    pub keyring_service: String,
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Used by tests to avoid touching the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let raw_url = lookup(ENV_API_URL)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AppError::Config(format!("{ENV_API_URL} not configured")))?;
        let api_url = validate_api_url(raw_url.trim())?;

        let base_path = normalize_base_path(lookup(ENV_BASE_PATH).as_deref().unwrap_or("/"));
        let request_timeout = Duration::from_secs(parse_secs(
            &lookup,
            ENV_REQUEST_TIMEOUT,
            DEFAULT_TIMEOUT_SECS,
        )?);
        let stale_time = Duration::from_secs(parse_secs(&lookup, ENV_STALE_TIME, DEFAULT_STALE_SECS)?);
        let keyring_service = lookup(ENV_KEYRING_SERVICE)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_KEYRING_SERVICE.to_string());

        Ok(Self {
            api_url,
            base_path,
            request_timeout,
            stale_time,
            keyring_service,
        })
    }

    /// Base URL without a trailing slash, ready for `format!("{base}{path}")`.
    pub fn api_base(&self) -> String {
        self.api_url.as_str().trim_end_matches('/').to_string()
    }
}

fn parse_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<u64, AppError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| AppError::Config(format!("{key} must be a whole number of seconds, got \"{raw}\""))),
    }
}

fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

/// Validate that the backend URL is well-formed and uses a safe scheme.
///
/// HTTPS for all remote hosts. HTTP is only permitted for loopback addresses
/// (`localhost`, `127.0.0.1`, `[::1]`) to support local development.
fn validate_api_url(raw: &str) -> Result<Url, AppError> {
    let parsed = Url::parse(raw).map_err(|e| AppError::Config(format!("Invalid backend URL: {e}")))?;

    match parsed.scheme() {
        "https" => Ok(parsed),
        "http" => {
            let host = parsed.host_str().unwrap_or("");
            if host == "localhost" || host == "127.0.0.1" || host == "[::1]" {
                Ok(parsed)
            } else {
                Err(AppError::Config(
                    "HTTP is only allowed for localhost. Use HTTPS for remote backends \
                     to protect the session token in transit."
                        .into(),
                ))
            }
        }
        other => Err(AppError::Config(format!(
            "Unsupported URL scheme \"{other}://\". Use HTTPS (or HTTP for localhost)."
        ))),
    }
}
