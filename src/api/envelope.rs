use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::AppError;

/// Message used when the backend signals failure without one.
const FALLBACK_MESSAGE: &str = "La operación no pudo completarse";

/// Backend response wrapper: `{success:true, result, count?}` or
/// `{success:false, message}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default)]
    pub result: serde_json::Value,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub count: Option<u64>,
}

/// A list result together with the total the backend reported, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub count: Option<u64>,
}

impl Envelope {
    pub fn from_value(body: serde_json::Value) -> Result<Self, AppError> {
        serde_json::from_value(body)
            .map_err(|e| AppError::Serde(format!("Response is not a valid envelope: {e}")))
    }

    /// Fail with the server message when `success` is false.
    pub fn check(self) -> Result<Self, AppError> {
        if self.success {
            Ok(self)
        } else {
            let message = self
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());
            Err(AppError::Request(message))
        }
    }

    pub fn into_result<T: DeserializeOwned>(self) -> Result<T, AppError> {
        let envelope = self.check()?;
        serde_json::from_value(envelope.result).map_err(AppError::from)
    }

    pub fn into_listing<T: DeserializeOwned>(self) -> Result<Listing<T>, AppError> {
        let envelope = self.check()?;
        let count = envelope.count;
        let items = match envelope.result {
            // Some list endpoints answer `result: null` when there is nothing.
            serde_json::Value::Null => Vec::new(),
            other => serde_json::from_value(other)?,
        };
        Ok(Listing { items, count })
    }
}

/// Server message carried by an error body, if the body is an envelope.
pub fn message_from_body(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
    }
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
}
