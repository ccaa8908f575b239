use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::validation::{
    optional_non_empty, require_non_empty, require_valid_id, Validate, ValidationErrors,
};

// ============================================================================
// Persona
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum TipoPersona {
    #[default]
    Fisica,
    Juridica,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Persona {
    pub id: i64,
    pub consorcio_id: i64,
    pub nombre: String,
    pub apellido: Option<String>,
    #[serde(default)]
    pub tipo_persona: TipoPersona,
    /// DNI, CUIT, pasaporte...
    pub tipo_identificacion: Option<String>,
    pub identificacion: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
}

impl Persona {
    /// "Apellido, Nombre" when an apellido is present.
    pub fn display_name(&self) -> String {
        match self.apellido.as_deref() {
            Some(apellido) if !apellido.trim().is_empty() => format!("{apellido}, {}", self.nombre),
            _ => self.nombre.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreatePersonaInput {
    pub consorcio_id: i64,
    pub nombre: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apellido: Option<String>,
    pub tipo_persona: TipoPersona,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo_identificacion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identificacion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdatePersonaInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apellido: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo_persona: Option<TipoPersona>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo_identificacion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identificacion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
}

fn check_email(errors: &mut ValidationErrors, email: Option<&str>) {
    if let Some(e) = email {
        let valid = e
            .split_once('@')
            .map(|(user, domain)| !user.is_empty() && domain.contains('.'))
            .unwrap_or(false);
        if !valid {
            errors.add("email", "email is not a valid address");
        }
    }
}

impl Validate for CreatePersonaInput {
    fn collect_errors(&self, errors: &mut ValidationErrors) {
        require_valid_id(errors, "consorcio_id", self.consorcio_id);
        require_non_empty(errors, "nombre", &self.nombre);
        if self.identificacion.is_some() && self.tipo_identificacion.is_none() {
            errors.add("tipo_identificacion", "tipo_identificacion is required with identificacion");
        }
        check_email(errors, self.email.as_deref());
    }
}

impl Validate for UpdatePersonaInput {
    fn collect_errors(&self, errors: &mut ValidationErrors) {
        optional_non_empty(errors, "nombre", self.nombre.as_deref());
        check_email(errors, self.email.as_deref());
    }
}

// ============================================================================
// Persona <-> Unidad link
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum RelacionUnidad {
    #[default]
    Propietario,
    Inquilino,
    #[serde(other)]
    Otro,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PersonaUnidad {
    pub persona_id: i64,
    pub unidad_id: i64,
    #[serde(default)]
    pub relacion: RelacionUnidad,
}

impl Validate for PersonaUnidad {
    fn collect_errors(&self, errors: &mut ValidationErrors) {
        require_valid_id(errors, "persona_id", self.persona_id);
        require_valid_id(errors, "unidad_id", self.unidad_id);
    }
}
