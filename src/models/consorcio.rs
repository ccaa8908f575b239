use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::Scope;
use crate::validation::{
    optional_non_empty, require_non_empty, require_period, Validate, ValidationErrors,
};

// ============================================================================
// Consorcio (building)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Domicilio {
    pub calle: String,
    pub numero: Option<String>,
    pub localidad: Option<String>,
    pub provincia: Option<String>,
    pub codigo_postal: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Consorcio {
    pub id: i64,
    pub nombre: String,
    pub tipo: String,
    /// Theme preset name chosen for this building (e.g. `"theme3"`).
    pub theme: Option<String>,
    /// Due days of the month for expensas.
    #[serde(default)]
    pub vencimientos: Vec<u8>,
    /// Last billed period, `YYYY-MM`.
    pub ultimo_periodo_liquidado: Option<String>,
    pub domicilio: Option<Domicilio>,
    pub customer_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateConsorcioInput {
    pub nombre: String,
    pub tipo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default)]
    pub vencimientos: Vec<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domicilio: Option<Domicilio>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdateConsorcioInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vencimientos: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ultimo_periodo_liquidado: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domicilio: Option<Domicilio>,
}

/// Consorcios are listed for the logged-in administration; the customer
/// filter is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ConsorcioFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
}

impl Scope for ConsorcioFilter {
    fn is_ready(&self) -> bool {
        true
    }
}

fn check_vencimientos(errors: &mut ValidationErrors, dias: &[u8]) {
    if dias.iter().any(|d| *d == 0 || *d > 31) {
        errors.add("vencimientos", "vencimientos must be days between 1 and 31");
    }
}

impl Validate for CreateConsorcioInput {
    fn collect_errors(&self, errors: &mut ValidationErrors) {
        require_non_empty(errors, "nombre", &self.nombre);
        require_non_empty(errors, "tipo", &self.tipo);
        check_vencimientos(errors, &self.vencimientos);
        if let Some(ref d) = self.domicilio {
            require_non_empty(errors, "domicilio.calle", &d.calle);
        }
    }
}

impl Validate for UpdateConsorcioInput {
    fn collect_errors(&self, errors: &mut ValidationErrors) {
        optional_non_empty(errors, "nombre", self.nombre.as_deref());
        optional_non_empty(errors, "tipo", self.tipo.as_deref());
        if let Some(ref v) = self.vencimientos {
            check_vencimientos(errors, v);
        }
        if let Some(ref p) = self.ultimo_periodo_liquidado {
            require_period(errors, "ultimo_periodo_liquidado", p);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_backend_shape_without_optional_fields() {
        let c: Consorcio = serde_json::from_value(serde_json::json!({
            "id": 5,
            "nombre": "Torre Norte",
            "tipo": "edificio",
            "theme": null,
            "ultimo_periodo_liquidado": "2024-02",
            "domicilio": null,
            "customer_id": 1
        }))
        .unwrap();
        assert_eq!(c.id, 5);
        assert!(c.vencimientos.is_empty());
    }

    #[test]
    fn rejects_out_of_range_vencimientos() {
        let input = CreateConsorcioInput {
            nombre: "Torre".into(),
            tipo: "edificio".into(),
            theme: None,
            vencimientos: vec![10, 32],
            domicilio: None,
            customer_id: None,
        };
        let err = input.validate().unwrap_err();
        assert!(err.to_string().contains("vencimientos"));
    }
}
