//! Read and write hooks: resource transport functions bound to the shared
//! request cache.

use crate::api::resource::{all_key, detail_key, list_key, write_invalidations, Resource, ResourceApi};
use crate::error::AppError;
use crate::models::Scope;
use crate::query::{Mutation, Query, QueryClient};

pub struct ResourceHooks<R: Resource> {
    pub(crate) api: ResourceApi<R>,
    pub(crate) queries: QueryClient,
}

impl<R: Resource> Clone for ResourceHooks<R> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            queries: self.queries.clone(),
        }
    }
}

impl<R: Resource> ResourceHooks<R> {
    pub fn new(api: ResourceApi<R>, queries: QueryClient) -> Self {
        Self { api, queries }
    }

    pub fn api(&self) -> &ResourceApi<R> {
        &self.api
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// List read under `[NAME, "list", filter]`. Disabled while the filter
    /// lacks its scope.
    pub fn use_list(&self, filter: R::Filter) -> Query<Vec<R::Entity>> {
        let enabled = filter.is_ready();
        let key = list_key::<R>(&filter);
        let api = self.api.clone();
        Query::new(&self.queries, key, enabled, move || {
            let api = api.clone();
            let filter = filter.clone();
            async move { api.list(&filter).await }
        })
    }

    /// Detail read under `[NAME, "detail", id]`. Disabled without an id.
    pub fn use_detail(&self, id: Option<i64>) -> Query<R::Entity> {
        let key = match id {
            Some(id) => detail_key::<R>(id),
            None => all_key::<R>().name("detail"),
        };
        let api = self.api.clone();
        Query::new(&self.queries, key, id.is_some(), move || {
            let api = api.clone();
            async move {
                match id {
                    Some(id) => api.get(id).await,
                    None => Err(AppError::Internal(format!("{} detail read without an id", R::NAME))),
                }
            }
        })
    }

    // ========================================================================
    // Writes
    // ========================================================================

    pub fn use_create(&self) -> Mutation<R::Create, R::Entity> {
        let api = self.api.clone();
        Mutation::new(&self.queries, move |input: R::Create| {
            let api = api.clone();
            async move { api.create(&input).await }
        })
        .invalidating(|_: &R::Create| write_invalidations::<R>(None))
    }

    /// Input is `(id, changes)`.
    pub fn use_update(&self) -> Mutation<(i64, R::Update), R::Entity> {
        let api = self.api.clone();
        Mutation::new(&self.queries, move |(id, input): (i64, R::Update)| {
            let api = api.clone();
            async move { api.update(id, &input).await }
        })
        .invalidating(|(id, _): &(i64, R::Update)| write_invalidations::<R>(Some(*id)))
    }

    pub fn use_delete(&self) -> Mutation<i64, bool> {
        let api = self.api.clone();
        Mutation::new(&self.queries, move |id: i64| {
            let api = api.clone();
            async move { api.delete(id).await }
        })
        .invalidating(|id: &i64| write_invalidations::<R>(Some(*id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::resources::{Proveedores, Rubros};
    use crate::api::testing::ScriptedTransport;
    use crate::api::ApiClient;
    use crate::models::{ConsorcioScope, CreateRubroInput};
    use crate::query::MutationStatus;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn hooks<R: Resource>(transport: Arc<ScriptedTransport>) -> ResourceHooks<R> {
        ResourceHooks::new(ResourceApi::new(ApiClient::new(transport)), QueryClient::default())
    }

    #[tokio::test]
    async fn list_without_scope_makes_no_calls() {
        let transport = Arc::new(ScriptedTransport::reply(json!({ "success": true, "result": [] })));
        let rubros = hooks::<Rubros>(transport.clone());

        let query = rubros.use_list(ConsorcioScope::default());
        let state = query.fetch().await;

        assert!(!query.is_enabled());
        assert!(state.data.is_none());
        assert!(!state.is_loading);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn concurrent_reads_of_one_scope_share_a_call() {
        let transport = Arc::new(
            ScriptedTransport::reply(json!({ "success": true, "result": [{ "id": 1, "consorcio_id": 5, "rubro": "Limpieza", "orden": 1 }] }))
                .delayed(Duration::from_millis(30)),
        );
        let rubros = hooks::<Rubros>(transport.clone());
        let a = rubros.use_list(ConsorcioScope::new(5));
        let b = rubros.use_list(ConsorcioScope::new(5));

        let (sa, sb) = tokio::join!(a.fetch(), b.fetch());

        assert_eq!(transport.calls(), 1);
        assert_eq!(sa.data_or_default().len(), 1);
        assert_eq!(sb.data_or_default()[0].rubro, "Limpieza");
    }

    #[tokio::test]
    async fn create_invalidates_lists_and_next_read_refetches_once() {
        let transport = Arc::new(ScriptedTransport::with_handler(|req| {
            Ok(if req.path == "/rubros/list" {
                json!({ "success": true, "result": [] })
            } else {
                json!({ "success": true, "result": { "id": 42, "consorcio_id": 5, "rubro": "Limpieza", "orden": 1 } })
            })
        }));
        let rubros = hooks::<Rubros>(transport.clone());
        let filter = ConsorcioScope::new(5);

        let list = rubros.use_list(filter.clone());
        list.fetch().await;
        list.fetch().await;
        assert_eq!(transport.calls_to("/rubros/list"), 1);

        let create = rubros.use_create();
        let created = create
            .mutate_async(CreateRubroInput {
                rubro: "Limpieza".into(),
                orden: 1,
                consorcio_id: 5,
            })
            .await
            .unwrap();
        assert_eq!(created.id, 42);
        assert_eq!(create.status(), MutationStatus::Success);

        // The observed list refetches in the background; a read after that
        // settles is served from cache.
        tokio::time::sleep(Duration::from_millis(20)).await;
        list.fetch().await;
        assert_eq!(transport.calls_to("/rubros/list"), 2);
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_backend() {
        let transport = Arc::new(ScriptedTransport::reply(json!({ "success": true })));
        let rubros = hooks::<Rubros>(transport.clone());

        let err = rubros
            .use_create()
            .mutate_async(CreateRubroInput {
                rubro: " ".into(),
                orden: 1,
                consorcio_id: 5,
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "validation");
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn rejected_delete_keeps_cache_and_surfaces_message() {
        let transport = Arc::new(ScriptedTransport::with_handler(|req| {
            Ok(if req.path == "/proveedores/list" {
                json!({ "success": true, "result": [{ "id": 3, "consorcio_id": 5, "nombre": "Limpiezas SRL" }] })
            } else {
                json!({ "success": false, "message": "Proveedor en uso" })
            })
        }));
        let proveedores = hooks::<Proveedores>(transport.clone());
        let filter = ConsorcioScope::new(5);
        let list = proveedores.use_list(filter.clone());
        list.fetch().await;

        let delete = proveedores.use_delete();
        let err = delete.mutate_async(3).await.unwrap_err();

        assert_eq!(err.to_string(), "Proveedor en uso");
        assert_eq!(delete.status(), MutationStatus::Error);
        assert!(!proveedores.queries.is_invalidated(&list_key::<Proveedores>(&filter)));
        assert_eq!(list.state().data_or_default().len(), 1);
        assert_eq!(transport.calls_to("/proveedores/list"), 1);
    }

    #[tokio::test]
    async fn detail_without_id_is_disabled() {
        let transport = Arc::new(ScriptedTransport::reply(json!({ "success": true })));
        let rubros = hooks::<Rubros>(transport.clone());
        let state = rubros.use_detail(None).fetch().await;
        assert!(state.data.is_none());
        assert_eq!(transport.calls(), 0);
    }
}
