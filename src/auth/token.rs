use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::AppError;

/// Identity extracted from the bearer token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionUser {
    pub id: String,
    pub email: Option<String>,
    pub nombre: Option<String>,
}

/// Client-side view of a JWT. The signature is not checked here; the
/// backend rejects forged or expired tokens on the next call.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedToken {
    pub user: SessionUser,
    /// Unix seconds.
    pub expires_at: i64,
}

impl DecodedToken {
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at <= now
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(chrono::Utc::now().timestamp())
    }
}

#[derive(Debug, Deserialize)]
struct Claims {
    exp: i64,
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    sub: Option<serde_json::Value>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    nombre: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

fn id_text(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Decode the payload segment of a JWT.
pub fn decode_token(token: &str) -> Result<DecodedToken, AppError> {
    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return Err(AppError::Auth("Malformed token".into())),
    };
    // Some issuers keep the padding; the no-pad engine rejects it.
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| AppError::Auth(format!("Malformed token payload: {e}")))?;
    let claims: Claims = serde_json::from_slice(&bytes)
        .map_err(|e| AppError::Auth(format!("Malformed token claims: {e}")))?;

    let id = claims
        .id
        .and_then(id_text)
        .or_else(|| claims.sub.and_then(id_text))
        .ok_or_else(|| AppError::Auth("Token has no user id".into()))?;

    Ok(DecodedToken {
        user: SessionUser {
            id,
            email: claims.email,
            nombre: claims.nombre.or(claims.name),
        },
        expires_at: claims.exp,
    })
}

#[cfg(test)]
pub(crate) fn make_token(claims: serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}
