use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::validation::{
    optional_non_empty, require_non_empty, require_range, require_valid_id, Validate,
    ValidationErrors,
};

// ============================================================================
// Unidad funcional / operativa
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum TipoUnidad {
    /// Billable unit with its own prorrateo (apartment, office).
    #[default]
    Funcional,
    /// Auxiliary unit (garage, storage) usually billed with a funcional.
    Operativa,
}

/// Who receives the expensas of a unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum LiquidarA {
    #[default]
    Propietario,
    Inquilino,
    #[serde(other)]
    Otro,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Unidad {
    pub id: i64,
    pub consorcio_id: i64,
    #[serde(default)]
    pub tipo: TipoUnidad,
    pub etiqueta: String,
    /// Free-form identifiers (piso, depto, cochera...).
    pub identificadores: Option<String>,
    /// Share of common expenses, in percent.
    pub prorrateo: f64,
    #[serde(default)]
    pub liquidar_a: LiquidarA,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateUnidadInput {
    pub consorcio_id: i64,
    pub tipo: TipoUnidad,
    pub etiqueta: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identificadores: Option<String>,
    pub prorrateo: f64,
    pub liquidar_a: LiquidarA,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdateUnidadInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo: Option<TipoUnidad>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etiqueta: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identificadores: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prorrateo: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liquidar_a: Option<LiquidarA>,
}

impl Validate for CreateUnidadInput {
    fn collect_errors(&self, errors: &mut ValidationErrors) {
        require_valid_id(errors, "consorcio_id", self.consorcio_id);
        require_non_empty(errors, "etiqueta", &self.etiqueta);
        require_range(errors, "prorrateo", self.prorrateo, 0.0, 100.0);
    }
}

impl Validate for UpdateUnidadInput {
    fn collect_errors(&self, errors: &mut ValidationErrors) {
        optional_non_empty(errors, "etiqueta", self.etiqueta.as_deref());
        if let Some(p) = self.prorrateo {
            require_range(errors, "prorrateo", p, 0.0, 100.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_liquidar_a_falls_back() {
        let u: Unidad = serde_json::from_value(serde_json::json!({
            "id": 1,
            "consorcio_id": 5,
            "tipo": "operativa",
            "etiqueta": "Cochera 3",
            "prorrateo": 1.25,
            "liquidar_a": "administrador"
        }))
        .unwrap();
        assert_eq!(u.tipo, TipoUnidad::Operativa);
        assert_eq!(u.liquidar_a, LiquidarA::Otro);
    }

    #[test]
    fn prorrateo_is_a_percentage() {
        let input = CreateUnidadInput {
            consorcio_id: 5,
            tipo: TipoUnidad::Funcional,
            etiqueta: "1A".into(),
            identificadores: None,
            prorrateo: 120.0,
            liquidar_a: LiquidarA::Propietario,
        };
        let err = input.validate().unwrap_err();
        assert!(err.to_string().contains("prorrateo"));
    }
}
