use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::validation::{optional_non_empty, require_non_empty, Validate, ValidationErrors};

// ============================================================================
// Customer (administración that owns consorcios)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customer {
    pub id: i64,
    pub nombre: String,
    pub email: Option<String>,
    pub telefono: Option<String>,
    #[serde(default = "default_true")]
    pub activo: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateCustomerInput {
    pub nombre: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdateCustomerInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activo: Option<bool>,
}

impl Validate for CreateCustomerInput {
    fn collect_errors(&self, errors: &mut ValidationErrors) {
        require_non_empty(errors, "nombre", &self.nombre);
    }
}

impl Validate for UpdateCustomerInput {
    fn collect_errors(&self, errors: &mut ValidationErrors) {
        optional_non_empty(errors, "nombre", self.nombre.as_deref());
    }
}
