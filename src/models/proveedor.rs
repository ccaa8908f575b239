use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::validation::{optional_non_empty, require_non_empty, require_valid_id, Validate, ValidationErrors};

// ============================================================================
// Proveedor (supplier)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Proveedor {
    pub id: i64,
    pub consorcio_id: i64,
    pub nombre: String,
    pub cuit: Option<String>,
    /// Default expense category for this supplier's invoices.
    pub rubro_id: Option<i64>,
    pub email: Option<String>,
    pub telefono: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateProveedorInput {
    pub consorcio_id: i64,
    pub nombre: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rubro_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdateProveedorInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rubro_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
}

/// CUIT is 11 digits; dashes are accepted.
fn check_cuit(errors: &mut ValidationErrors, cuit: Option<&str>) {
    if let Some(c) = cuit {
        let digits: String = c.chars().filter(|ch| *ch != '-').collect();
        if digits.len() != 11 || !digits.chars().all(|ch| ch.is_ascii_digit()) {
            errors.add("cuit", "cuit must have 11 digits");
        }
    }
}

impl Validate for CreateProveedorInput {
    fn collect_errors(&self, errors: &mut ValidationErrors) {
        require_valid_id(errors, "consorcio_id", self.consorcio_id);
        require_non_empty(errors, "nombre", &self.nombre);
        check_cuit(errors, self.cuit.as_deref());
    }
}

impl Validate for UpdateProveedorInput {
    fn collect_errors(&self, errors: &mut ValidationErrors) {
        optional_non_empty(errors, "nombre", self.nombre.as_deref());
        check_cuit(errors, self.cuit.as_deref());
    }
}
