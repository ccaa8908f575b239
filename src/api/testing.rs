//! Scripted in-process transport for unit tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::api::transport::{ApiRequest, Transport};
use crate::error::AppError;

type Handler = Box<dyn Fn(&ApiRequest) -> Result<Value, AppError> + Send + Sync>;

pub(crate) struct ScriptedTransport {
    sent: Mutex<Vec<ApiRequest>>,
    handler: Handler,
    delay: Duration,
}

impl ScriptedTransport {
    /// Answer every request with the same body.
    pub(crate) fn reply(body: Value) -> Self {
        Self::with_handler(move |_| Ok(body.clone()))
    }

    pub(crate) fn with_handler(
        handler: impl Fn(&ApiRequest) -> Result<Value, AppError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            handler: Box::new(handler),
            delay: Duration::ZERO,
        }
    }

    /// Hold every response for `delay`, so concurrent callers overlap.
    pub(crate) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn calls(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub(crate) fn calls_to(&self, path: &str) -> usize {
        self.sent.lock().unwrap().iter().filter(|r| r.path == path).count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, AppError> {
        let reply = (self.handler)(&request);
        self.sent.lock().unwrap().push(request);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        reply
    }
}
