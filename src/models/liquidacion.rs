use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::validation::{require_period, require_valid_id, Validate, ValidationErrors};

// ============================================================================
// Liquidacion (periodic billing statement)
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum EstadoLiquidacion {
    #[default]
    Borrador,
    Emitida,
    Cerrada,
    #[serde(other)]
    Desconocido,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Liquidacion {
    pub id: i64,
    pub consorcio_id: i64,
    /// `YYYY-MM`
    pub periodo: String,
    #[serde(default)]
    pub estado: EstadoLiquidacion,
    #[serde(default)]
    pub total: f64,
    /// Due dates, `YYYY-MM-DD`.
    #[serde(default)]
    pub vencimientos: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateLiquidacionInput {
    pub consorcio_id: i64,
    pub periodo: String,
    #[serde(default)]
    pub vencimientos: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdateLiquidacionInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<EstadoLiquidacion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vencimientos: Option<Vec<String>>,
}

/// Body of `POST /liquidaciones/generar`: the backend aggregates the
/// period's gastos into per-unit fees.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GenerarLiquidacionInput {
    pub consorcio_id: i64,
    pub periodo: String,
}

fn check_vencimientos(errors: &mut ValidationErrors, fechas: &[String]) {
    let bad = fechas
        .iter()
        .any(|f| chrono::NaiveDate::parse_from_str(f, "%Y-%m-%d").is_err());
    if bad {
        errors.add("vencimientos", "vencimientos must be dates in YYYY-MM-DD format");
    }
}

impl Validate for CreateLiquidacionInput {
    fn collect_errors(&self, errors: &mut ValidationErrors) {
        require_valid_id(errors, "consorcio_id", self.consorcio_id);
        require_period(errors, "periodo", &self.periodo);
        check_vencimientos(errors, &self.vencimientos);
    }
}

impl Validate for UpdateLiquidacionInput {
    fn collect_errors(&self, errors: &mut ValidationErrors) {
        if let Some(ref v) = self.vencimientos {
            check_vencimientos(errors, v);
        }
    }
}

impl Validate for GenerarLiquidacionInput {
    fn collect_errors(&self, errors: &mut ValidationErrors) {
        require_valid_id(errors, "consorcio_id", self.consorcio_id);
        require_period(errors, "periodo", &self.periodo);
    }
}

// ============================================================================
// LiquidacionUnidad / Deudor
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum EstadoDeuda {
    #[default]
    Impaga,
    Parcial,
    Pagada,
    #[serde(other)]
    Desconocido,
}

/// Fee of one unit in one liquidación. Rows with `deuda > 0` are the
/// "deudores" list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LiquidacionUnidad {
    pub id: i64,
    pub liquidacion_id: i64,
    pub unidad_id: i64,
    pub monto: f64,
    #[serde(default)]
    pub saldado: f64,
    #[serde(default)]
    pub deuda: f64,
    #[serde(default)]
    pub estado: EstadoDeuda,
    /// Denormalized for the deudores table.
    pub etiqueta: Option<String>,
    pub periodo: Option<String>,
}

impl LiquidacionUnidad {
    pub fn is_deudor(&self) -> bool {
        self.deuda > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generar_requires_period() {
        let input = GenerarLiquidacionInput {
            consorcio_id: 5,
            periodo: "marzo".into(),
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn deudor_flag_follows_deuda() {
        let row: LiquidacionUnidad = serde_json::from_value(serde_json::json!({
            "id": 9, "liquidacion_id": 2, "unidad_id": 4,
            "monto": 50000.0, "saldado": 20000.0, "deuda": 30000.0, "estado": "parcial"
        }))
        .unwrap();
        assert!(row.is_deudor());
        assert_eq!(row.estado, EstadoDeuda::Parcial);
    }
}
