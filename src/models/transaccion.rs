use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::Scope;
use crate::validation::{
    optional_non_empty, require_date, require_positive, require_valid_id, Validate,
    ValidationErrors,
};

// ============================================================================
// Transaccion (account movement)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum TipoMovimiento {
    Ingreso,
    Egreso,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Transaccion {
    pub id: i64,
    pub cuenta_id: i64,
    pub monto: f64,
    pub tipo_movimiento: TipoMovimiento,
    pub estado: String,
    pub fecha: String,
    pub descripcion: Option<String>,
    /// Table of the record that produced this movement (e.g. `"pagos_proveedores"`).
    pub referencia_tabla: Option<String>,
    pub referencia_id: Option<i64>,
}

impl Transaccion {
    /// Amount with sign applied: ingresos positive, egresos negative.
    pub fn signed_monto(&self) -> f64 {
        match self.tipo_movimiento {
            TipoMovimiento::Ingreso => self.monto,
            TipoMovimiento::Egreso => -self.monto,
        }
    }
}

/// Manual movement (opening balance, bank fee...). Movements produced by
/// payments are created by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateTransaccionInput {
    pub cuenta_id: i64,
    pub monto: f64,
    pub tipo_movimiento: TipoMovimiento,
    pub fecha: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdateTransaccionInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransaccionFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consorcio_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuenta_id: Option<i64>,
}

/// Either scope is enough: all movements of a consorcio, or one account.
impl Scope for TransaccionFilter {
    fn is_ready(&self) -> bool {
        self.consorcio_id.is_some() || self.cuenta_id.is_some()
    }
}

impl Validate for CreateTransaccionInput {
    fn collect_errors(&self, errors: &mut ValidationErrors) {
        require_valid_id(errors, "cuenta_id", self.cuenta_id);
        require_positive(errors, "monto", self.monto);
        require_date(errors, "fecha", &self.fecha);
    }
}

impl Validate for UpdateTransaccionInput {
    fn collect_errors(&self, errors: &mut ValidationErrors) {
        optional_non_empty(errors, "estado", self.estado.as_deref());
    }
}
