use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::client::ApiClient;
use crate::api::envelope::Listing;
use crate::error::AppError;
use crate::models::Scope;
use crate::query::QueryKey;
use crate::validation::{Validate, ValidationErrors};

/// A backend resource exposed through the list/get/create/update/delete
/// convention.
pub trait Resource: Send + Sync + 'static {
    /// Root segment of every cache key for this resource.
    const NAME: &'static str;
    /// Endpoint root, e.g. `/rubros`.
    const PATH: &'static str;

    type Entity: DeserializeOwned + Clone + Send + Sync + 'static;
    type Create: Serialize + Validate + Send + Sync + 'static;
    type Update: Serialize + Validate + Send + Sync + 'static;
    type Filter: Serialize + Scope + Clone + Send + Sync + 'static;

    /// Other resources whose cached reads a successful write makes stale
    /// (a payment moves account balances, for instance).
    fn related() -> &'static [&'static str] {
        &[]
    }
}

// ============================================================================
// Key builder
// ============================================================================

/// `[NAME]`: everything cached for the resource.
pub fn all_key<R: Resource>() -> QueryKey {
    QueryKey::new(R::NAME)
}

/// `[NAME, "list"]`: prefix of every list, whatever the filter.
pub fn lists_key<R: Resource>() -> QueryKey {
    all_key::<R>().name("list")
}

/// `[NAME, "list", filter]`
pub fn list_key<R: Resource>(filter: &R::Filter) -> QueryKey {
    lists_key::<R>().params(filter)
}

/// `[NAME, "detail", id]`
pub fn detail_key<R: Resource>(id: i64) -> QueryKey {
    all_key::<R>().name("detail").id(id)
}

/// Prefixes a successful write on R invalidates: R's lists, plus the
/// detail of the touched record and every related resource.
pub fn write_invalidations<R: Resource>(id: Option<i64>) -> Vec<QueryKey> {
    let mut keys = vec![lists_key::<R>()];
    if let Some(id) = id {
        keys.push(detail_key::<R>(id));
    }
    keys.extend(R::related().iter().map(|name| QueryKey::new(name)));
    keys
}

// ============================================================================
// Transport functions
// ============================================================================

/// One network call per verb, envelope unwrapped.
pub struct ResourceApi<R: Resource> {
    pub(crate) api: ApiClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Clone for ResourceApi<R> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> ResourceApi<R> {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            _resource: PhantomData,
        }
    }

    /// `POST {PATH}/list` with the filter as body.
    pub async fn list(&self, filter: &R::Filter) -> Result<Vec<R::Entity>, AppError> {
        Ok(self.list_with_count(filter).await?.items)
    }

    pub async fn list_with_count(&self, filter: &R::Filter) -> Result<Listing<R::Entity>, AppError> {
        if !filter.is_ready() {
            let mut errors = ValidationErrors::default();
            errors.add("scope", format!("{} list requires its scope", R::NAME));
            return Err(AppError::Validation(errors));
        }
        self.api.post_list(&format!("{}/list", R::PATH), filter).await
    }

    /// `GET {PATH}/{id}`
    pub async fn get(&self, id: i64) -> Result<R::Entity, AppError> {
        self.api.get(&format!("{}/{}", R::PATH, id)).await
    }

    /// `POST {PATH}`
    pub async fn create(&self, input: &R::Create) -> Result<R::Entity, AppError> {
        input.validate()?;
        self.api.post(R::PATH, input).await
    }

    /// `PUT {PATH}/{id}`
    pub async fn update(&self, id: i64, input: &R::Update) -> Result<R::Entity, AppError> {
        input.validate()?;
        self.api.put(&format!("{}/{}", R::PATH, id), input).await
    }

    /// `DELETE {PATH}/{id}`
    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        self.api.delete(&format!("{}/{}", R::PATH, id)).await
    }
}
