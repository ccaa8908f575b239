use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::envelope::{Envelope, Listing};
use crate::api::transport::{ApiRequest, Transport};
use crate::error::AppError;

/// Envelope-aware backend client shared by every resource.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    // --------------------------------------------------------------------
    // Private helpers
    // --------------------------------------------------------------------

    async fn envelope(&self, request: ApiRequest) -> Result<Envelope, AppError> {
        let body = self.transport.send(request).await?;
        Envelope::from_value(body)
    }

    fn request<B: Serialize + ?Sized>(
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<ApiRequest, AppError> {
        let req = ApiRequest::new(method, path);
        Ok(match body {
            Some(b) => req.with_body(serde_json::to_value(b)?),
            None => req,
        })
    }

    // --------------------------------------------------------------------
    // Verbs
    // --------------------------------------------------------------------

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let req = Self::request::<()>(Method::GET, path, None)?;
        self.envelope(req).await?.into_result()
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, AppError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = Self::request(Method::POST, path, Some(body))?;
        self.envelope(req).await?.into_result()
    }

    /// POST with a filter body, the backend's list convention.
    pub async fn post_list<B, T>(&self, path: &str, filter: &B) -> Result<Listing<T>, AppError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = Self::request(Method::POST, path, Some(filter))?;
        self.envelope(req).await?.into_listing()
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, AppError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = Self::request(Method::PUT, path, Some(body))?;
        self.envelope(req).await?.into_result()
    }

    /// Success is signalled by the envelope alone; any result is ignored.
    pub async fn delete(&self, path: &str) -> Result<bool, AppError> {
        let req = Self::request::<()>(Method::DELETE, path, None)?;
        self.envelope(req).await?.check()?;
        Ok(true)
    }

    /// POST whose result is ignored.
    pub async fn post_ok<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<bool, AppError> {
        let req = Self::request(Method::POST, path, Some(body))?;
        self.envelope(req).await?.check()?;
        Ok(true)
    }
}
