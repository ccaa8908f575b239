use std::future::Future;
use std::sync::{Arc, Mutex};

use futures_util::future::{BoxFuture, FutureExt};

use crate::error::AppError;
use crate::query::{QueryClient, QueryKey};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MutationStatus {
    #[default]
    Idle,
    Pending,
    Success,
    Error,
}

struct Tracked<O> {
    status: MutationStatus,
    data: Option<O>,
    error: Option<AppError>,
}

impl<O> Default for Tracked<O> {
    fn default() -> Self {
        Self {
            status: MutationStatus::Idle,
            data: None,
            error: None,
        }
    }
}

type RunFn<I, O> = Arc<dyn Fn(I) -> BoxFuture<'static, Result<O, AppError>> + Send + Sync>;
type KeysFn<I> = Arc<dyn Fn(&I) -> Vec<QueryKey> + Send + Sync>;

/// A tracked write. On success every key prefix produced by the
/// invalidation function is invalidated; on failure the cache is untouched.
///
/// There is no optimistic update: readers see the old data until their
/// refetch completes.
pub struct Mutation<I, O> {
    client: QueryClient,
    run: RunFn<I, O>,
    invalidates: KeysFn<I>,
    tracked: Arc<Mutex<Tracked<O>>>,
}

impl<I, O> Clone for Mutation<I, O> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            run: self.run.clone(),
            invalidates: self.invalidates.clone(),
            tracked: self.tracked.clone(),
        }
    }
}

impl<I: Send + 'static, O: Clone + Send + 'static> Mutation<I, O> {
    pub fn new<F, Fut>(client: &QueryClient, run: F) -> Self
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, AppError>> + Send + 'static,
    {
        Self {
            client: client.clone(),
            run: Arc::new(move |input| run(input).boxed()),
            invalidates: Arc::new(|_: &I| Vec::new()),
            tracked: Arc::new(Mutex::new(Tracked::default())),
        }
    }

    /// Key prefixes to invalidate after a successful write. Computed from the
    /// input before it is consumed.
    pub fn invalidating<K>(mut self, keys: K) -> Self
    where
        K: Fn(&I) -> Vec<QueryKey> + Send + Sync + 'static,
    {
        self.invalidates = Arc::new(keys);
        self
    }

    pub async fn mutate_async(&self, input: I) -> Result<O, AppError> {
        let keys = (self.invalidates)(&input);
        self.update(|t| {
            t.status = MutationStatus::Pending;
            t.error = None;
        });

        match (self.run)(input).await {
            Ok(output) => {
                for key in &keys {
                    self.client.invalidate_queries(key);
                }
                self.update(|t| {
                    t.status = MutationStatus::Success;
                    t.data = Some(output.clone());
                });
                Ok(output)
            }
            Err(e) => {
                tracing::warn!(error = %e, kind = e.kind(), "Mutation failed");
                self.update(|t| {
                    t.status = MutationStatus::Error;
                    t.error = Some(e.clone());
                });
                Err(e)
            }
        }
    }

    pub fn status(&self) -> MutationStatus {
        self.lock().status
    }

    pub fn is_pending(&self) -> bool {
        self.status() == MutationStatus::Pending
    }

    pub fn data(&self) -> Option<O> {
        self.lock().data.clone()
    }

    pub fn error(&self) -> Option<AppError> {
        self.lock().error.clone()
    }

    pub fn reset(&self) {
        *self.lock() = Tracked::default();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tracked<O>> {
        self.tracked.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn update(&self, f: impl FnOnce(&mut Tracked<O>)) {
        f(&mut self.lock());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn list_key() -> QueryKey {
        QueryKey::new("proveedores").name("list").id(5)
    }

    #[tokio::test]
    async fn success_invalidates_and_tracks_data() {
        let client = QueryClient::new(Duration::from_secs(60));
        client.set_query_data(&list_key(), vec![1_i64]);

        let create = Mutation::new(&client, |n: i64| async move { Ok(n * 2) })
            .invalidating(|_| vec![QueryKey::new("proveedores").name("list")]);

        assert_eq!(create.mutate_async(21).await.unwrap(), 42);
        assert_eq!(create.status(), MutationStatus::Success);
        assert_eq!(create.data(), Some(42));
        assert!(client.is_invalidated(&list_key()));
    }

    #[tokio::test]
    async fn failure_leaves_cache_untouched() {
        let client = QueryClient::new(Duration::from_secs(60));
        client.set_query_data(&list_key(), vec![1_i64]);

        let delete = Mutation::new(&client, |_id: i64| async move {
            Err::<bool, _>(AppError::Request("Proveedor en uso".into()))
        })
        .invalidating(|_| vec![QueryKey::new("proveedores")]);

        let err = delete.mutate_async(3).await.unwrap_err();
        assert_eq!(err.to_string(), "Proveedor en uso");
        assert_eq!(delete.status(), MutationStatus::Error);
        assert!(!client.is_invalidated(&list_key()));
        assert_eq!(*client.get_query_data::<Vec<i64>>(&list_key()).unwrap(), vec![1]);

        delete.reset();
        assert_eq!(delete.status(), MutationStatus::Idle);
        assert!(delete.error().is_none());
    }
}
