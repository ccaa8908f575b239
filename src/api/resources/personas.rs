use serde_json::json;

use super::{Personas, Unidades};
use crate::api::resource::{all_key, lists_key, ResourceApi};
use crate::error::AppError;
use crate::hooks::ResourceHooks;
use crate::models::PersonaUnidad;
use crate::query::{Mutation, Query, QueryKey};
use crate::validation::Validate;

impl Personas {
    /// `["personas", "unidades", persona_id]`
    pub fn unidades_key(persona_id: i64) -> QueryKey {
        all_key::<Self>().name("unidades").id(persona_id)
    }
}

impl ResourceApi<Personas> {
    /// Units a persona is linked to, with the kind of link.
    pub async fn unidades(&self, persona_id: i64) -> Result<Vec<PersonaUnidad>, AppError> {
        let listing = self
            .api
            .post_list::<_, PersonaUnidad>("/personas/unidades", &json!({ "persona_id": persona_id }))
            .await?;
        Ok(listing.items)
    }

    pub async fn vincular_unidad(&self, link: &PersonaUnidad) -> Result<bool, AppError> {
        link.validate()?;
        self.api.post_ok("/personas/vincular", link).await
    }

    pub async fn desvincular_unidad(&self, link: &PersonaUnidad) -> Result<bool, AppError> {
        link.validate()?;
        self.api.post_ok("/personas/desvincular", link).await
    }
}

/// A link change shows up in the persona's unit list, in persona lists
/// (owner/tenant columns) and in unidad lists.
fn link_invalidations(link: &PersonaUnidad) -> Vec<QueryKey> {
    vec![
        Personas::unidades_key(link.persona_id),
        lists_key::<Personas>(),
        lists_key::<Unidades>(),
    ]
}

impl ResourceHooks<Personas> {
    pub fn use_unidades(&self, persona_id: Option<i64>) -> Query<Vec<PersonaUnidad>> {
        let key = match persona_id {
            Some(id) => Personas::unidades_key(id),
            None => all_key::<Personas>().name("unidades"),
        };
        let api = self.api.clone();
        Query::new(&self.queries, key, persona_id.is_some(), move || {
            let api = api.clone();
            async move { api.unidades(persona_id.unwrap_or_default()).await }
        })
    }

    pub fn use_vincular_unidad(&self) -> Mutation<PersonaUnidad, bool> {
        let api = self.api.clone();
        Mutation::new(&self.queries, move |link: PersonaUnidad| {
            let api = api.clone();
            async move { api.vincular_unidad(&link).await }
        })
        .invalidating(link_invalidations)
    }

    pub fn use_desvincular_unidad(&self) -> Mutation<PersonaUnidad, bool> {
        let api = self.api.clone();
        Mutation::new(&self.queries, move |link: PersonaUnidad| {
            let api = api.clone();
            async move { api.desvincular_unidad(&link).await }
        })
        .invalidating(link_invalidations)
    }
}
