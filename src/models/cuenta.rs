use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::validation::{optional_non_empty, require_non_empty, require_valid_id, Validate, ValidationErrors};

// ============================================================================
// Cuenta (cash / bank account of a consorcio)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cuenta {
    pub id: i64,
    pub consorcio_id: i64,
    pub nombre: String,
    /// "caja", "banco", ... as configured in the backend.
    pub tipo_cuenta: String,
    #[serde(default)]
    pub saldo: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateCuentaInput {
    pub consorcio_id: i64,
    pub nombre: String,
    pub tipo_cuenta: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saldo_inicial: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdateCuentaInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo_cuenta: Option<String>,
}

impl Validate for CreateCuentaInput {
    fn collect_errors(&self, errors: &mut ValidationErrors) {
        require_valid_id(errors, "consorcio_id", self.consorcio_id);
        require_non_empty(errors, "nombre", &self.nombre);
        require_non_empty(errors, "tipo_cuenta", &self.tipo_cuenta);
        if matches!(self.saldo_inicial, Some(s) if !s.is_finite()) {
            errors.add("saldo_inicial", "saldo_inicial must be a number");
        }
    }
}

impl Validate for UpdateCuentaInput {
    fn collect_errors(&self, errors: &mut ValidationErrors) {
        optional_non_empty(errors, "nombre", self.nombre.as_deref());
        optional_non_empty(errors, "tipo_cuenta", self.tipo_cuenta.as_deref());
    }
}
