use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::Scope;
use crate::validation::{
    require_date, require_period, require_positive, require_valid_id, Validate, ValidationErrors,
};

// ============================================================================
// Gasto (expense)
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum TipoGasto {
    #[default]
    Ordinario,
    Extraordinario,
    /// Charged to a single unit instead of prorated.
    Particular,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum EstadoGasto {
    #[default]
    Pendiente,
    Parcial,
    Saldado,
    #[serde(other)]
    Desconocido,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Gasto {
    pub id: i64,
    pub consorcio_id: i64,
    pub rubro_id: i64,
    pub proveedor_id: Option<i64>,
    /// Set when the expense belongs to one unit rather than the whole building.
    pub unidad_id: Option<i64>,
    pub descripcion: Option<String>,
    pub monto: f64,
    /// Amount already paid to the supplier.
    #[serde(default)]
    pub saldado: f64,
    #[serde(default)]
    pub tipo_gasto: TipoGasto,
    #[serde(default)]
    pub estado: EstadoGasto,
    pub fecha: String,
    pub periodo: Option<String>,
}

impl Gasto {
    pub fn pendiente(&self) -> f64 {
        (self.monto - self.saldado).max(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateGastoInput {
    pub consorcio_id: i64,
    pub rubro_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proveedor_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unidad_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    pub monto: f64,
    pub tipo_gasto: TipoGasto,
    pub fecha: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub periodo: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdateGastoInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rubro_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proveedor_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monto: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo_gasto: Option<TipoGasto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub periodo: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GastoFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consorcio_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub periodo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<EstadoGasto>,
}

impl Scope for GastoFilter {
    fn is_ready(&self) -> bool {
        self.consorcio_id.is_some()
    }
}

impl Validate for CreateGastoInput {
    fn collect_errors(&self, errors: &mut ValidationErrors) {
        require_valid_id(errors, "consorcio_id", self.consorcio_id);
        require_valid_id(errors, "rubro_id", self.rubro_id);
        require_positive(errors, "monto", self.monto);
        require_date(errors, "fecha", &self.fecha);
        if let Some(ref p) = self.periodo {
            require_period(errors, "periodo", p);
        }
        if self.tipo_gasto == TipoGasto::Particular && self.unidad_id.is_none() {
            errors.add("unidad_id", "unidad_id is required for a particular expense");
        }
    }
}

impl Validate for UpdateGastoInput {
    fn collect_errors(&self, errors: &mut ValidationErrors) {
        if let Some(m) = self.monto {
            require_positive(errors, "monto", m);
        }
        if let Some(ref f) = self.fecha {
            require_date(errors, "fecha", f);
        }
        if let Some(ref p) = self.periodo {
            require_period(errors, "periodo", p);
        }
    }
}
