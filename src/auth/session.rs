use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::auth::token::{decode_token, SessionUser};
use crate::auth::token_store::TokenStore;
use crate::error::AppError;
use crate::query::QueryClient;
use crate::store::{Action, AppStore};
use crate::validation::{require_non_empty, Validate, ValidationErrors};

#[derive(Debug, Clone, Serialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

impl Validate for LoginInput {
    fn collect_errors(&self, errors: &mut ValidationErrors) {
        require_non_empty(errors, "email", &self.email);
        if !self.email.trim().is_empty() && !self.email.contains('@') {
            errors.add("email", "email must be a valid address");
        }
        require_non_empty(errors, "password", &self.password);
    }
}

#[derive(Debug, Deserialize)]
struct LoginResult {
    token: String,
}

/// Session lifecycle: token persistence, the auth slice of the store, and
/// the request cache that must not outlive a user.
#[derive(Clone)]
pub struct Session {
    api: ApiClient,
    store: AppStore,
    tokens: Arc<dyn TokenStore>,
    queries: QueryClient,
}

impl Session {
    pub fn new(api: ApiClient, store: AppStore, tokens: Arc<dyn TokenStore>, queries: QueryClient) -> Self {
        Self {
            api,
            store,
            tokens,
            queries,
        }
    }

    /// Load the persisted token into the store. Expired or undecodable
    /// tokens are discarded. Returns whether a session was restored.
    pub fn restore(&self) -> Result<bool, AppError> {
        let Some(token) = self.tokens.load()? else {
            tracing::debug!("No persisted session");
            return Ok(false);
        };

        let decoded = match decode_token(&token) {
            Ok(d) if !d.is_expired() => d,
            Ok(d) => {
                tracing::warn!(user = %d.user.id, expires_at = d.expires_at, "Discarding expired session token");
                self.tokens.clear()?;
                return Ok(false);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable session token");
                self.tokens.clear()?;
                return Ok(false);
            }
        };

        tracing::info!(user = %decoded.user.id, "Session restored");
        self.store.dispatch(Action::LoggedIn {
            token,
            user: decoded.user,
            expires_at: decoded.expires_at,
        });
        Ok(true)
    }

    /// `POST /auth/login`, then persist the token and mark the session
    /// logged in.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionUser, AppError> {
        let input = LoginInput {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        input.validate()?;

        let LoginResult { token } = self.api.post("/auth/login", &input).await?;
        let decoded = decode_token(&token)?;
        if decoded.is_expired() {
            return Err(AppError::Auth("Backend issued an expired token".into()));
        }

        self.tokens.save(&token)?;
        self.store.dispatch(Action::LoggedIn {
            token,
            user: decoded.user.clone(),
            expires_at: decoded.expires_at,
        });
        tracing::info!(user = %decoded.user.id, "Logged in");
        Ok(decoded.user)
    }

    /// Clear the persisted token, the auth and consorcio slices, and every
    /// cached read.
    pub fn logout(&self) -> Result<(), AppError> {
        let cleared = self.tokens.clear();
        self.store.dispatch(Action::LoggedOut);
        self.queries.clear();
        tracing::info!("Logged out");
        cleared
    }

    /// A 401 from any call ends the session locally. Returns the error so
    /// callers can keep propagating it.
    pub fn check(&self, err: AppError) -> AppError {
        if matches!(err, AppError::Auth(_)) && self.store.state().auth.is_logged_in() {
            tracing::warn!(error = %err, "Backend rejected the session");
            if let Err(e) = self.logout() {
                tracing::warn!(error = %e, "Failed to clear rejected session");
            }
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::ScriptedTransport;
    use crate::auth::token::make_token;
    use crate::auth::token_store::MemoryTokenStore;
    use serde_json::json;

    fn future_exp() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    fn session(transport: ScriptedTransport, tokens: MemoryTokenStore) -> (Session, Arc<MemoryTokenStore>) {
        let tokens = Arc::new(tokens);
        let session = Session::new(
            ApiClient::new(Arc::new(transport)),
            AppStore::default(),
            tokens.clone(),
            QueryClient::default(),
        );
        (session, tokens)
    }

    #[test]
    fn restore_accepts_a_live_token() {
        let token = make_token(json!({ "id": 7, "exp": future_exp() }));
        let (session, _) = session(ScriptedTransport::reply(json!({})), MemoryTokenStore::with_token(&token));

        assert!(session.restore().unwrap());
        let state = session.store.state();
        assert_eq!(state.auth.token.as_deref(), Some(token.as_str()));
        assert_eq!(state.auth.user.map(|u| u.id).as_deref(), Some("7"));
    }

    #[test]
    fn restore_discards_expired_and_garbage_tokens() {
        let expired = make_token(json!({ "id": 7, "exp": 1 }));
        for token in [expired.as_str(), "garbage"] {
            let (session, tokens) = session(ScriptedTransport::reply(json!({})), MemoryTokenStore::with_token(token));
            assert!(!session.restore().unwrap());
            assert!(!session.store.state().auth.is_logged_in());
            assert_eq!(tokens.load().unwrap(), None);
        }
    }

    #[tokio::test]
    async fn login_persists_token_and_logout_clears_everything() {
        let token = make_token(json!({ "id": 3, "email": "ana@example.com", "exp": future_exp() }));
        let transport = ScriptedTransport::reply(json!({ "success": true, "result": { "token": token } }));
        let (session, tokens) = session(transport, MemoryTokenStore::default());

        let user = session.login("ana@example.com", "secret").await.unwrap();
        assert_eq!(user.id, "3");
        assert_eq!(tokens.load().unwrap().as_deref(), Some(token.as_str()));
        assert!(session.store.state().auth.is_logged_in());

        let key = crate::query::QueryKey::new("rubros");
        session.queries.set_query_data(&key, 1_u8);
        session.logout().unwrap();

        assert!(!session.store.state().auth.is_logged_in());
        assert_eq!(tokens.load().unwrap(), None);
        assert!(!session.queries.contains(&key));
    }

    #[tokio::test]
    async fn login_rejection_surfaces_backend_message() {
        let transport = ScriptedTransport::reply(json!({ "success": false, "message": "Credenciales inválidas" }));
        let (session, tokens) = session(transport, MemoryTokenStore::default());

        let err = session.login("ana@example.com", "wrong").await.unwrap_err();

        assert_eq!(err.to_string(), "Credenciales inválidas");
        assert_eq!(tokens.load().unwrap(), None);
    }

    #[tokio::test]
    async fn login_validates_before_calling() {
        let transport = Arc::new(ScriptedTransport::reply(json!({})));
        let session = Session::new(
            ApiClient::new(transport.clone()),
            AppStore::default(),
            Arc::new(MemoryTokenStore::default()),
            QueryClient::default(),
        );
        let err = session.login("not-an-email", "").await.unwrap_err();
        assert_eq!(err.kind(), "validation");
        assert_eq!(transport.calls(), 0);
    }
}
