use serde_json::json;

use super::{Gastos, Liquidaciones};
use crate::api::resource::{all_key, ResourceApi};
use crate::error::AppError;
use crate::hooks::ResourceHooks;
use crate::models::{GenerarLiquidacionInput, Liquidacion, LiquidacionUnidad};
use crate::query::{Mutation, Query, QueryKey};
use crate::validation::Validate;

impl Liquidaciones {
    /// `["liquidaciones", "unidades", liquidacion_id]`
    pub fn unidades_key(liquidacion_id: i64) -> QueryKey {
        all_key::<Self>().name("unidades").id(liquidacion_id)
    }

    /// `["liquidaciones", "deudores", {consorcio_id}]`
    pub fn deudores_key(consorcio_id: Option<i64>) -> QueryKey {
        all_key::<Self>()
            .name("deudores")
            .params(&json!({ "consorcio_id": consorcio_id }))
    }
}

// ============================================================================
// Transport
// ============================================================================

impl ResourceApi<Liquidaciones> {
    /// Per-unit rows of one liquidacion.
    pub async fn unidades(&self, liquidacion_id: i64) -> Result<Vec<LiquidacionUnidad>, AppError> {
        let listing = self
            .api
            .post_list::<_, LiquidacionUnidad>("/liquidaciones/unidades", &json!({ "liquidacion_id": liquidacion_id }))
            .await?;
        Ok(listing.items)
    }

    /// Units of a consorcio with an outstanding balance on any liquidacion.
    pub async fn deudores(&self, consorcio_id: i64) -> Result<Vec<LiquidacionUnidad>, AppError> {
        let listing = self
            .api
            .post_list::<_, LiquidacionUnidad>("/liquidaciones/deudores", &json!({ "consorcio_id": consorcio_id }))
            .await?;
        Ok(listing
            .items
            .into_iter()
            .filter(LiquidacionUnidad::is_deudor)
            .collect())
    }

    /// Aggregate the period's gastos into a new liquidacion.
    pub async fn generar(&self, input: &GenerarLiquidacionInput) -> Result<Liquidacion, AppError> {
        input.validate()?;
        self.api.post("/liquidaciones/generar", input).await
    }

    /// Close a liquidacion; no further gastos are added to its period.
    pub async fn cerrar(&self, id: i64) -> Result<Liquidacion, AppError> {
        self.api.post(&format!("/liquidaciones/{id}/cerrar"), &json!({})).await
    }
}

// ============================================================================
// Hooks
// ============================================================================

impl ResourceHooks<Liquidaciones> {
    pub fn use_unidades(&self, liquidacion_id: Option<i64>) -> Query<Vec<LiquidacionUnidad>> {
        let key = match liquidacion_id {
            Some(id) => Liquidaciones::unidades_key(id),
            None => all_key::<Liquidaciones>().name("unidades"),
        };
        let api = self.api.clone();
        Query::new(&self.queries, key, liquidacion_id.is_some(), move || {
            let api = api.clone();
            async move { api.unidades(liquidacion_id.unwrap_or_default()).await }
        })
    }

    pub fn use_deudores(&self, consorcio_id: Option<i64>) -> Query<Vec<LiquidacionUnidad>> {
        let api = self.api.clone();
        Query::new(
            &self.queries,
            Liquidaciones::deudores_key(consorcio_id),
            consorcio_id.is_some(),
            move || {
                let api = api.clone();
                async move { api.deudores(consorcio_id.unwrap_or_default()).await }
            },
        )
    }

    /// Generating touches every liquidacion view and marks the period's
    /// gastos as liquidated.
    pub fn use_generar(&self) -> Mutation<GenerarLiquidacionInput, Liquidacion> {
        let api = self.api.clone();
        Mutation::new(&self.queries, move |input: GenerarLiquidacionInput| {
            let api = api.clone();
            async move { api.generar(&input).await }
        })
        .invalidating(|_: &GenerarLiquidacionInput| vec![all_key::<Liquidaciones>(), all_key::<Gastos>()])
    }

    pub fn use_cerrar(&self) -> Mutation<i64, Liquidacion> {
        let api = self.api.clone();
        Mutation::new(&self.queries, move |id: i64| {
            let api = api.clone();
            async move { api.cerrar(id).await }
        })
        .invalidating(|_: &i64| vec![all_key::<Liquidaciones>()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::ScriptedTransport;
    use crate::api::ApiClient;
    use crate::query::QueryClient;
    use reqwest::Method;
    use std::sync::Arc;

    fn hooks(transport: Arc<ScriptedTransport>) -> ResourceHooks<Liquidaciones> {
        ResourceHooks::new(ResourceApi::new(ApiClient::new(transport)), QueryClient::default())
    }

    #[tokio::test]
    async fn deudores_keeps_only_units_with_debt() {
        let transport = Arc::new(ScriptedTransport::reply(json!({
            "success": true,
            "result": [
                { "id": 1, "liquidacion_id": 9, "unidad_id": 1, "monto": 100.0, "saldado": 100.0, "deuda": 0.0, "estado": "pagada" },
                { "id": 2, "liquidacion_id": 9, "unidad_id": 2, "monto": 100.0, "saldado": 40.0, "deuda": 60.0, "estado": "parcial" }
            ]
        })));
        let liq = hooks(transport.clone());

        let state = liq.use_deudores(Some(5)).fetch().await;

        let deudores = state.data_or_default();
        assert_eq!(deudores.len(), 1);
        assert_eq!(deudores[0].unidad_id, 2);
        let sent = transport.requests();
        assert_eq!(sent[0].path, "/liquidaciones/deudores");
        assert_eq!(sent[0].body, Some(json!({ "consorcio_id": 5 })));
    }

    #[tokio::test]
    async fn deudores_without_consorcio_is_disabled() {
        let transport = Arc::new(ScriptedTransport::reply(json!({ "success": true, "result": [] })));
        hooks(transport.clone()).use_deudores(None).fetch().await;
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn cerrar_posts_to_the_liquidacion_and_invalidates_its_root() {
        let transport = Arc::new(ScriptedTransport::reply(json!({
            "success": true,
            "result": { "id": 9, "consorcio_id": 5, "periodo": "2024-03", "estado": "cerrada" }
        })));
        let liq = hooks(transport.clone());
        liq.queries.set_query_data(&Liquidaciones::unidades_key(9), Vec::<LiquidacionUnidad>::new());

        let closed = liq.use_cerrar().mutate_async(9).await.unwrap();

        assert_eq!(closed.estado, crate::models::EstadoLiquidacion::Cerrada);
        let sent = transport.requests();
        assert_eq!(sent[0].method, Method::POST);
        assert_eq!(sent[0].path, "/liquidaciones/9/cerrar");
        assert!(liq.queries.is_invalidated(&Liquidaciones::unidades_key(9)));
    }

    #[tokio::test]
    async fn generar_validates_period_first() {
        let transport = Arc::new(ScriptedTransport::reply(json!({ "success": true })));
        let err = hooks(transport.clone())
            .use_generar()
            .mutate_async(GenerarLiquidacionInput {
                consorcio_id: 5,
                periodo: "marzo".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "validation");
        assert_eq!(transport.calls(), 0);
    }
}
