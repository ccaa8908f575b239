use std::any::Any;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use futures_util::future::FutureExt;
use tokio::sync::broadcast;

use crate::error::AppError;
use crate::query::{CacheEvent, Fetcher, QueryClient, QueryData, QueryKey};

/// What a read hook hands to its caller.
pub struct QueryState<T> {
    pub data: Option<Arc<T>>,
    /// No data yet and a fetch is running.
    pub is_loading: bool,
    /// A fetch is running, with or without previous data.
    pub is_fetching: bool,
    pub is_stale: bool,
    pub error: Option<AppError>,
}

impl<T> QueryState<T> {
    fn idle() -> Self {
        Self {
            data: None,
            is_loading: false,
            is_fetching: false,
            is_stale: false,
            error: None,
        }
    }

    /// Data or an empty fallback, for views that treat "missing" as "none".
    pub fn data_or_default(&self) -> T
    where
        T: Clone + Default,
    {
        self.data.as_deref().cloned().unwrap_or_default()
    }
}

impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            is_loading: self.is_loading,
            is_fetching: self.is_fetching,
            is_stale: self.is_stale,
            error: self.error.clone(),
        }
    }
}

impl<T> std::fmt::Debug for QueryState<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryState")
            .field("has_data", &self.data.is_some())
            .field("is_loading", &self.is_loading)
            .field("is_fetching", &self.is_fetching)
            .field("is_stale", &self.is_stale)
            .field("error", &self.error)
            .finish()
    }
}

fn downcast<T: Any + Send + Sync>(key: &QueryKey, data: QueryData) -> Result<Arc<T>, AppError> {
    data.downcast::<T>().map_err(|_| {
        AppError::Internal(format!(
            "cached value for {key} is not a {}",
            std::any::type_name::<T>()
        ))
    })
}

/// A bound read: key + fetch function + enabled flag.
///
/// While alive it counts as an observer of its key, so invalidations
/// refetch it in the background. Disabled queries never fetch and never
/// observe.
pub struct Query<T> {
    client: QueryClient,
    key: QueryKey,
    fetcher: Fetcher,
    enabled: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> Query<T> {
    pub fn new<F, Fut>(client: &QueryClient, key: QueryKey, enabled: bool, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, AppError>> + Send + 'static,
    {
        let fetcher: Fetcher = Arc::new(move || {
            let fut = fetch();
            async move { fut.await.map(|v| Arc::new(v) as QueryData) }.boxed()
        });
        if enabled {
            client.add_observer(&key, fetcher.clone());
        } else {
            tracing::debug!(key = %key, "Query disabled until its scope is available");
        }
        Self {
            client: client.clone(),
            key,
            fetcher,
            enabled,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Resolve the query: cached, joined, or freshly fetched.
    pub async fn fetch(&self) -> QueryState<T> {
        if !self.enabled {
            return QueryState::idle();
        }
        let result = self.client.fetch_query(&self.key, self.fetcher.clone()).await;
        self.settle(result)
    }

    /// Fetch even if the cached data is fresh.
    pub async fn refetch(&self) -> QueryState<T> {
        if !self.enabled {
            return QueryState::idle();
        }
        let result = self.client.refetch_query(&self.key, self.fetcher.clone()).await;
        self.settle(result)
    }

    /// Current cache view without triggering a fetch.
    pub fn state(&self) -> QueryState<T> {
        if !self.enabled {
            return QueryState::idle();
        }
        let Some(snap) = self.client.snapshot(&self.key) else {
            return QueryState::idle();
        };
        let data = snap.data.and_then(|d| downcast::<T>(&self.key, d).ok());
        QueryState {
            is_loading: data.is_none() && snap.is_fetching,
            is_fetching: snap.is_fetching,
            is_stale: snap.is_stale,
            data,
            error: snap.error,
        }
    }

    /// Cache events for this query's key only.
    pub async fn changed(&self, events: &mut broadcast::Receiver<CacheEvent>) -> Option<CacheEvent> {
        loop {
            match events.recv().await {
                Ok(event) if event.key() == &self.key => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(key = %self.key, skipped, "Query event subscriber lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    fn settle(&self, result: Result<QueryData, AppError>) -> QueryState<T> {
        let mut state = self.state();
        match result.and_then(|d| downcast::<T>(&self.key, d)) {
            Ok(data) => {
                state.data = Some(data);
                state.error = None;
            }
            Err(e) => state.error = Some(e),
        }
        state.is_loading = false;
        state
    }
}

impl<T> Drop for Query<T> {
    fn drop(&mut self) {
        if self.enabled {
            self.client.remove_observer(&self.key);
        }
    }
}
