//! HttpTransport against an in-process axum backend speaking the
//! `{success, result|message}` envelope.

use std::sync::Arc;

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use consorcio_admin::api::{ApiClient, Cuentas, HttpTransport, Proveedores, ResourceApi, Rubros};
use consorcio_admin::auth::SessionUser;
use consorcio_admin::config::{AppConfig, ENV_API_URL};
use consorcio_admin::error::AppError;
use consorcio_admin::models::ConsorcioScope;
use consorcio_admin::store::{Action, AppStore};

const TOKEN: &str = "t-123";

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

async fn list_rubros(headers: HeaderMap, Json(filter): Json<Value>) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "message": "Token inválido" })),
        );
    }
    let body = json!({
        "success": true,
        "result": [{ "id": 1, "consorcio_id": filter["consorcio_id"], "rubro": "Limpieza", "orden": 1 }],
        "count": 1
    });
    (StatusCode::OK, Json(body))
}

async fn delete_proveedor(Path(_id): Path<i64>) -> Json<Value> {
    Json(json!({ "success": false, "message": "Proveedor en uso" }))
}

async fn delete_rubro(Path(_id): Path<i64>) -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn get_cuenta(Path(_id): Path<i64>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "success": false, "message": "Base de datos no disponible" })),
    )
}

async fn spawn_backend() -> String {
    let router = Router::new()
        .route("/rubros/list", post(list_rubros))
        .route("/rubros/{id}", delete(delete_rubro))
        .route("/proveedores/{id}", delete(delete_proveedor))
        .route("/cuentas/{id}", get(get_cuenta));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://127.0.0.1:{}", addr.port())
}

fn api(base: &str, logged_in: bool) -> ApiClient {
    let base = base.to_string();
    let config = AppConfig::from_lookup(move |k| (k == ENV_API_URL).then(|| base.clone())).unwrap();
    let store = AppStore::default();
    if logged_in {
        store.dispatch(Action::LoggedIn {
            token: TOKEN.into(),
            user: SessionUser {
                id: "1".into(),
                email: None,
                nombre: None,
            },
            expires_at: i64::MAX,
        });
    }
    ApiClient::new(Arc::new(HttpTransport::new(&config, store).unwrap()))
}

#[tokio::test]
async fn list_posts_filter_with_bearer_token() {
    let base = spawn_backend().await;
    let rubros = ResourceApi::<Rubros>::new(api(&base, true));

    let listing = rubros.list_with_count(&ConsorcioScope::new(5)).await.unwrap();

    assert_eq!(listing.count, Some(1));
    assert_eq!(listing.items[0].consorcio_id, 5);
    assert_eq!(listing.items[0].rubro, "Limpieza");
}

#[tokio::test]
async fn missing_token_is_an_auth_error() {
    let base = spawn_backend().await;
    let rubros = ResourceApi::<Rubros>::new(api(&base, false));

    let err = rubros.list(&ConsorcioScope::new(5)).await.unwrap_err();

    assert_eq!(err.kind(), "auth");
    assert!(err.to_string().contains("Token inválido"));
}

#[tokio::test]
async fn envelope_failure_carries_server_message() {
    let base = spawn_backend().await;
    let proveedores = ResourceApi::<Proveedores>::new(api(&base, true));

    let err = proveedores.delete(3).await.unwrap_err();

    assert!(matches!(err, AppError::Request(_)));
    assert_eq!(err.to_string(), "Proveedor en uso");
}

#[tokio::test]
async fn server_error_keeps_status_and_message() {
    let base = spawn_backend().await;
    let cuentas = ResourceApi::<Cuentas>::new(api(&base, true));

    match cuentas.get(1).await.unwrap_err() {
        AppError::Http { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Base de datos no disponible");
        }
        other => panic!("expected HTTP error, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_success_body_counts_as_success() {
    let base = spawn_backend().await;
    let rubros = ResourceApi::<Rubros>::new(api(&base, true));
    assert!(rubros.delete(7).await.unwrap());
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let rubros = ResourceApi::<Rubros>::new(api(&format!("http://127.0.0.1:{port}"), true));
    let err = rubros.list(&ConsorcioScope::new(5)).await.unwrap_err();
    assert_eq!(err.kind(), "network");
}
