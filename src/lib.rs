pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod forms;
pub mod hooks;
pub mod logging;
pub mod menu;
pub mod models;
pub mod query;
pub mod store;
pub mod table;
pub mod validation;

use std::sync::Arc;

use api::{ApiClient, Consorcios, HttpTransport, Resource, ResourceApi, Transport};
use auth::{KeyringTokenStore, Session, TokenStore};
use config::AppConfig;
use error::AppError;
use hooks::ResourceHooks;
use models::{Consorcio, ConsorcioFilter};
use query::QueryClient;
use store::{Action, AppStore};

/// Everything a view needs, passed explicitly instead of living in
/// globals. Cheap to clone.
#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub store: AppStore,
    pub queries: QueryClient,
    pub api: ApiClient,
    pub session: Session,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        store: AppStore,
        transport: Arc<dyn Transport>,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        let queries = QueryClient::new(config.stale_time);
        let api = ApiClient::new(transport);
        let session = Session::new(api.clone(), store.clone(), tokens, queries.clone());
        Self {
            config,
            store,
            queries,
            api,
            session,
        }
    }

    /// Production wiring: reqwest transport reading the token from the
    /// store, token persisted in the OS keyring.
    pub fn from_config(config: AppConfig) -> Result<Self, AppError> {
        let store = AppStore::default();
        let transport = Arc::new(HttpTransport::new(&config, store.clone())?);
        let tokens = Arc::new(KeyringTokenStore::new(config.keyring_service.clone()));
        Ok(Self::new(config, store, transport, tokens))
    }

    /// Read and write hooks for one resource, sharing this context's cache.
    pub fn resource<R: Resource>(&self) -> ResourceHooks<R> {
        ResourceHooks::new(ResourceApi::new(self.api.clone()), self.queries.clone())
    }

    /// Make `consorcio` the working scope. The theme preset follows it.
    pub fn select_consorcio(&self, consorcio: Consorcio) {
        tracing::info!(id = consorcio.id, nombre = %consorcio.nombre, "Consorcio selected");
        self.store.dispatch(Action::SelectConsorcio(consorcio));
    }

    /// Select by id, reading the consorcio through the detail cache.
    pub async fn select_consorcio_by_id(&self, id: i64) -> Result<Consorcio, AppError> {
        let state = self.resource::<Consorcios>().use_detail(Some(id)).fetch().await;
        if let Some(err) = state.error {
            return Err(self.session.check(err));
        }
        let consorcio = state
            .data
            .map(|c| c.as_ref().clone())
            .ok_or_else(|| AppError::NotFound(format!("consorcio {id}")))?;
        self.select_consorcio(consorcio.clone());
        Ok(consorcio)
    }

    pub fn clear_consorcio(&self) {
        self.store.dispatch(Action::ClearConsorcio);
    }
}

/// Headless entry point: restore the persisted session, load the consorcios
/// it can see and select the first one.
pub fn run() -> Result<(), AppError> {
    logging::init();

    tracing::info!("Starting consorcio-admin v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::from_env()?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::Internal(format!("failed to start async runtime: {e}")))?;

    runtime.block_on(async move {
        let ctx = AppContext::from_config(config)?;
        tracing::info!(api = %ctx.config.api_base(), base_path = %ctx.config.base_path, "Backend configured");

        if !ctx.session.restore()? {
            tracing::warn!("No active session; log in to load consorcios");
            return Ok(());
        }

        let consorcios = ctx.resource::<Consorcios>().use_list(ConsorcioFilter::default());
        let state = consorcios.fetch().await;
        if let Some(err) = state.error {
            return Err(ctx.session.check(err));
        }

        let list = state.data_or_default();
        tracing::info!(count = list.len(), "Consorcios loaded");
        if let Some(first) = list.first() {
            ctx.select_consorcio(first.clone());
            let preset = ctx.store.state().customization.preset;
            tracing::info!(preset = preset.as_str(), "Theme applied");
        }
        Ok(())
    })
}
