use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::validation::{optional_non_empty, require_non_empty, require_valid_id, Validate, ValidationErrors};

// ============================================================================
// Rubro (expense category)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rubro {
    pub id: i64,
    pub consorcio_id: i64,
    pub rubro: String,
    /// Position of the category in the printed liquidación.
    pub orden: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateRubroInput {
    pub rubro: String,
    pub orden: i32,
    pub consorcio_id: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdateRubroInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rubro: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orden: Option<i32>,
}

impl Validate for CreateRubroInput {
    fn collect_errors(&self, errors: &mut ValidationErrors) {
        require_non_empty(errors, "rubro", &self.rubro);
        if self.orden < 0 {
            errors.add("orden", "orden must be zero or greater");
        }
        require_valid_id(errors, "consorcio_id", self.consorcio_id);
    }
}

impl Validate for UpdateRubroInput {
    fn collect_errors(&self, errors: &mut ValidationErrors) {
        optional_non_empty(errors, "rubro", self.rubro.as_deref());
        if matches!(self.orden, Some(o) if o < 0) {
            errors.add("orden", "orden must be zero or greater");
        }
    }
}
