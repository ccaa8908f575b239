use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::validation::{require_date, require_positive, require_valid_id, Validate, ValidationErrors};

// ============================================================================
// Pagos
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum TipoPago {
    #[default]
    Efectivo,
    Transferencia,
    Cheque,
    Tarjeta,
    #[serde(other)]
    Otro,
}

/// Payment to a supplier that settles (part of) a gasto.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PagoProveedor {
    pub id: i64,
    pub consorcio_id: i64,
    pub gasto_id: i64,
    pub cuenta_id: i64,
    pub monto: f64,
    pub fecha: String,
    #[serde(default)]
    pub tipo_pago: TipoPago,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreatePagoProveedorInput {
    pub consorcio_id: i64,
    pub gasto_id: i64,
    pub cuenta_id: i64,
    pub monto: f64,
    pub fecha: String,
    pub tipo_pago: TipoPago,
}

/// Payment of a unit's expensas that settles (part of) a liquidación row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PagoLiquidacionUnidad {
    pub id: i64,
    pub consorcio_id: i64,
    pub liquidacion_unidad_id: i64,
    pub cuenta_id: i64,
    pub monto: f64,
    pub fecha: String,
    #[serde(default)]
    pub tipo_pago: TipoPago,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreatePagoLiquidacionUnidadInput {
    pub consorcio_id: i64,
    pub liquidacion_unidad_id: i64,
    pub cuenta_id: i64,
    pub monto: f64,
    pub fecha: String,
    pub tipo_pago: TipoPago,
}

/// Payments are corrected by deleting and re-entering, except for the
/// date and method.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdatePagoInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo_pago: Option<TipoPago>,
}

impl Validate for CreatePagoProveedorInput {
    fn collect_errors(&self, errors: &mut ValidationErrors) {
        require_valid_id(errors, "consorcio_id", self.consorcio_id);
        require_valid_id(errors, "gasto_id", self.gasto_id);
        require_valid_id(errors, "cuenta_id", self.cuenta_id);
        require_positive(errors, "monto", self.monto);
        require_date(errors, "fecha", &self.fecha);
    }
}

impl Validate for CreatePagoLiquidacionUnidadInput {
    fn collect_errors(&self, errors: &mut ValidationErrors) {
        require_valid_id(errors, "consorcio_id", self.consorcio_id);
        require_valid_id(errors, "liquidacion_unidad_id", self.liquidacion_unidad_id);
        require_valid_id(errors, "cuenta_id", self.cuenta_id);
        require_positive(errors, "monto", self.monto);
        require_date(errors, "fecha", &self.fecha);
    }
}

impl Validate for UpdatePagoInput {
    fn collect_errors(&self, errors: &mut ValidationErrors) {
        if let Some(ref f) = self.fecha {
            require_date(errors, "fecha", f);
        }
    }
}
