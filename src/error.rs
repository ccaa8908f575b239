use serde::Serialize;

use crate::validation::ValidationErrors;

/// App-wide error type. Every fallible function returns `Result<T, AppError>`.
///
/// `Clone` because one in-flight request result is handed to every caller that
/// joined it. Serializes as `{ error, kind }` for the UI layer.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AppError {
    /// Client-side validation failed before any request was sent.
    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    /// The backend answered 2xx with `{success:false, message}`.
    /// Displays the server message verbatim.
    #[error("{0}")]
    Request(String),

    /// The backend answered with a non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The request never produced a response (DNS, connect, timeout).
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Serialization error: {0}")]
    Serde(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Short machine-readable discriminator used by the UI layer.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::Request(_) => "request",
            AppError::Http { .. } => "http",
            AppError::Network(_) => "network",
            AppError::Auth(_) => "auth",
            AppError::Serde(_) => "serde",
            AppError::Config(_) => "config",
            AppError::Storage(_) => "storage",
            AppError::NotFound(_) => "not_found",
            AppError::Internal(_) => "internal",
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Serde(e.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            return AppError::Http {
                status: status.as_u16(),
                message: e.to_string(),
            };
        }
        if e.is_decode() {
            return AppError::Serde(e.to_string());
        }
        AppError::Network(e.to_string())
    }
}

impl From<keyring::Error> for AppError {
    fn from(e: keyring::Error) -> Self {
        AppError::Storage(e.to_string())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(e: ValidationErrors) -> Self {
        AppError::Validation(e)
    }
}

/// Serialized as `{ error: "...", kind: "..." }` for frontend consumption.
/// Validation errors also carry the per-field map under `fields`.
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let fields = match self {
            AppError::Validation(errors) => Some(errors),
            _ => None,
        };
        let mut s = serializer.serialize_struct("AppError", if fields.is_some() { 3 } else { 2 })?;
        s.serialize_field("error", &self.to_string())?;
        s.serialize_field("kind", self.kind())?;
        if let Some(errors) = fields {
            s.serialize_field("fields", errors)?;
        }
        s.end()
    }
}
