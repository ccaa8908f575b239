//! Caching and invalidation behavior of the resource hooks, driven through
//! `AppContext` with a counting in-process transport.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use consorcio_admin::api::resource::list_key;
use consorcio_admin::api::{ApiRequest, PagosProveedores, Proveedores, Rubros, Transport};
use consorcio_admin::auth::MemoryTokenStore;
use consorcio_admin::config::{AppConfig, ENV_API_URL};
use consorcio_admin::error::AppError;
use consorcio_admin::models::{ConsorcioScope, CreatePagoProveedorInput, CreateRubroInput, Rubro, TipoPago};
use consorcio_admin::query::MutationStatus;
use consorcio_admin::store::AppStore;
use consorcio_admin::AppContext;

type Route = Box<dyn Fn(&ApiRequest) -> Value + Send + Sync>;

/// Answers by path and counts every call.
struct MockBackend {
    route: Route,
    calls: Mutex<Vec<String>>,
    delay: Duration,
}

impl MockBackend {
    fn new(route: impl Fn(&ApiRequest) -> Value + Send + Sync + 'static) -> Arc<Self> {
        Self::delayed(Duration::ZERO, route)
    }

    fn delayed(delay: Duration, route: impl Fn(&ApiRequest) -> Value + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            route: Box::new(route),
            calls: Mutex::new(Vec::new()),
            delay,
        })
    }

    fn calls_to(&self, path: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|p| *p == path).count()
    }

    fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockBackend {
    async fn send(&self, request: ApiRequest) -> Result<Value, AppError> {
        self.calls.lock().unwrap().push(request.path.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok((self.route)(&request))
    }
}

fn context(backend: Arc<MockBackend>) -> AppContext {
    let config = AppConfig::from_lookup(|k| (k == ENV_API_URL).then(|| "https://api.example.com".to_string())).unwrap();
    AppContext::new(config, AppStore::default(), backend, Arc::new(MemoryTokenStore::default()))
}

fn rubro(id: i64, consorcio_id: i64, nombre: &str) -> Value {
    json!({ "id": id, "consorcio_id": consorcio_id, "rubro": nombre, "orden": 1 })
}

#[tokio::test]
async fn created_rubro_resolves_and_marks_its_list_stale() {
    let backend = MockBackend::new(|req| match req.path.as_str() {
        "/rubros/list" => json!({ "success": true, "result": [rubro(1, 5, "Agua")] }),
        "/rubros" => json!({ "success": true, "result": rubro(42, 5, "Limpieza") }),
        other => json!({ "success": false, "message": format!("unexpected {other}") }),
    });
    let ctx = context(backend.clone());
    let rubros = ctx.resource::<Rubros>();
    let scope = ConsorcioScope::new(5);

    // Read once, then unmount the view.
    {
        let list = rubros.use_list(scope.clone());
        assert_eq!(list.fetch().await.data_or_default().len(), 1);
    }
    assert_eq!(backend.calls_to("/rubros/list"), 1);

    let created = rubros
        .use_create()
        .mutate_async(CreateRubroInput {
            rubro: "Limpieza".into(),
            orden: 1,
            consorcio_id: 5,
        })
        .await
        .unwrap();

    assert_eq!(created.id, 42);
    assert!(ctx.queries.is_invalidated(&list_key::<Rubros>(&scope)));

    // Exactly one new request on the next read, then cache hits again.
    let list = rubros.use_list(scope.clone());
    list.fetch().await;
    list.fetch().await;
    assert_eq!(backend.calls_to("/rubros/list"), 2);
    assert!(!ctx.queries.is_invalidated(&list_key::<Rubros>(&scope)));
}

#[tokio::test]
async fn other_scopes_and_resources_are_not_invalidated() {
    let backend = MockBackend::new(|req| match req.path.as_str() {
        "/rubros/list" | "/proveedores/list" => json!({ "success": true, "result": [] }),
        _ => json!({ "success": true, "result": rubro(42, 5, "Limpieza") }),
    });
    let ctx = context(backend.clone());
    let five = ConsorcioScope::new(5);
    let six = ConsorcioScope::new(6);
    ctx.queries.set_query_data(&list_key::<Rubros>(&six), Vec::<Rubro>::new());
    ctx.queries.set_query_data(&list_key::<Proveedores>(&five), Vec::<Rubro>::new());

    ctx.resource::<Rubros>()
        .use_create()
        .mutate_async(CreateRubroInput {
            rubro: "Limpieza".into(),
            orden: 1,
            consorcio_id: 5,
        })
        .await
        .unwrap();

    // Create invalidates every rubro list, but nothing outside rubros.
    assert!(ctx.queries.is_invalidated(&list_key::<Rubros>(&six)));
    assert!(!ctx.queries.is_invalidated(&list_key::<Proveedores>(&five)));
}

#[tokio::test]
async fn read_without_scope_issues_no_calls() {
    let backend = MockBackend::new(|_| json!({ "success": true, "result": [] }));
    let ctx = context(backend.clone());

    let list = ctx.resource::<Rubros>().use_list(ConsorcioScope::from(ctx.store.selected_consorcio_id()));
    let state = list.fetch().await;
    list.refetch().await;

    assert!(!list.is_enabled());
    assert!(state.data.is_none() && state.error.is_none());
    assert_eq!(backend.total_calls(), 0);
}

#[tokio::test]
async fn two_views_share_one_in_flight_read() {
    let backend = MockBackend::delayed(Duration::from_millis(50), |_| {
        json!({ "success": true, "result": [rubro(1, 5, "Agua")] })
    });
    let ctx = context(backend.clone());
    let sidebar = ctx.resource::<Rubros>().use_list(ConsorcioScope::new(5));
    let page = ctx.resource::<Rubros>().use_list(ConsorcioScope::new(5));

    let (a, b) = tokio::join!(sidebar.fetch(), page.fetch());

    assert_eq!(backend.calls_to("/rubros/list"), 1);
    assert_eq!(a.data_or_default(), b.data_or_default());
}

#[tokio::test]
async fn envelope_failure_rejects_reads_and_writes_with_server_message() {
    let backend = MockBackend::new(|_| json!({ "success": false, "message": "X" }));
    let ctx = context(backend.clone());
    let rubros = ctx.resource::<Rubros>();

    let state = rubros.use_list(ConsorcioScope::new(5)).fetch().await;
    assert_eq!(state.error.map(|e| e.to_string()).as_deref(), Some("X"));

    let update = rubros.use_update();
    let err = update
        .mutate_async((1, Default::default()))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "X");
    assert_eq!(update.status(), MutationStatus::Error);
}

#[tokio::test]
async fn rejected_proveedor_delete_leaves_list_cache_untouched() {
    let listed = Arc::new(AtomicUsize::new(0));
    let counter = listed.clone();
    let backend = MockBackend::new(move |req| {
        if req.path == "/proveedores/list" {
            counter.fetch_add(1, Ordering::SeqCst);
            json!({ "success": true, "result": [{ "id": 3, "consorcio_id": 5, "nombre": "Limpiezas SRL" }] })
        } else {
            json!({ "success": false, "message": "Proveedor en uso" })
        }
    });
    let ctx = context(backend.clone());
    let proveedores = ctx.resource::<Proveedores>();
    let scope = ConsorcioScope::new(5);
    let list = proveedores.use_list(scope.clone());
    list.fetch().await;

    let err = proveedores.use_delete().mutate_async(3).await.unwrap_err();

    assert_eq!(err.to_string(), "Proveedor en uso");
    assert!(!ctx.queries.is_invalidated(&list_key::<Proveedores>(&scope)));
    assert_eq!(list.fetch().await.data_or_default()[0].nombre, "Limpiezas SRL");
    assert_eq!(listed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn supplier_payment_invalidates_related_resources() {
    let backend = MockBackend::new(|_| {
        json!({
            "success": true,
            "result": { "id": 8, "consorcio_id": 5, "gasto_id": 2, "cuenta_id": 1, "monto": 500.0, "fecha": "2024-03-10", "tipo_pago": "transferencia" }
        })
    });
    let ctx = context(backend.clone());
    let scope = ConsorcioScope::new(5);
    let gastos_key = consorcio_admin::query::QueryKey::new("gastos").name("list").params(&scope);
    let cuentas_key = consorcio_admin::query::QueryKey::new("cuentas").name("detail").id(1);
    let rubros_key = list_key::<Rubros>(&scope);
    for key in [&gastos_key, &cuentas_key, &rubros_key] {
        ctx.queries.set_query_data(key, 0_u8);
    }

    ctx.resource::<PagosProveedores>()
        .use_create()
        .mutate_async(CreatePagoProveedorInput {
            consorcio_id: 5,
            gasto_id: 2,
            cuenta_id: 1,
            monto: 500.0,
            fecha: "2024-03-10".into(),
            tipo_pago: TipoPago::Transferencia,
        })
        .await
        .unwrap();

    assert!(ctx.queries.is_invalidated(&gastos_key));
    assert!(ctx.queries.is_invalidated(&cuentas_key));
    assert!(!ctx.queries.is_invalidated(&rubros_key));
}
