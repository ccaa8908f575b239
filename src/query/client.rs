use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::broadcast;

use crate::error::AppError;
use crate::query::QueryKey;

/// Type-erased cached value. Typed access goes through [`crate::query::Query`].
pub type QueryData = Arc<dyn Any + Send + Sync>;

/// Produces one network read for a key. Stored on the entry so invalidation
/// can refetch keys that still have observers.
pub type Fetcher = Arc<dyn Fn() -> BoxFuture<'static, Result<QueryData, AppError>> + Send + Sync>;

type SharedFetch = Shared<BoxFuture<'static, Result<QueryData, AppError>>>;

/// Capacity of the cache event channel. Slow subscribers lag, they never
/// block the cache.
const EVENT_CAPACITY: usize = 256;

/// How long an unobserved, idle entry is kept before garbage collection.
pub const DEFAULT_GC_TIME: Duration = Duration::from_secs(5 * 60);

// ============================================================================
// Events
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// A fetch completed or data was set directly.
    Updated(QueryKey),
    /// The entry was marked stale by a write.
    Invalidated(QueryKey),
    Removed(QueryKey),
}

impl CacheEvent {
    pub fn key(&self) -> &QueryKey {
        match self {
            CacheEvent::Updated(k) | CacheEvent::Invalidated(k) | CacheEvent::Removed(k) => k,
        }
    }
}

// ============================================================================
// Entries
// ============================================================================

struct InFlight {
    id: u64,
    /// Cache generation when the fetch started.
    generation: u64,
    future: SharedFetch,
}

#[derive(Default)]
struct Entry {
    data: Option<QueryData>,
    /// Generation the stored data was fetched under.
    data_generation: u64,
    error: Option<AppError>,
    updated_at: Option<Instant>,
    invalidated: bool,
    /// Bumped by every invalidation. A read that started under an older
    /// generation may not mark the entry fresh.
    generation: u64,
    in_flight: Option<InFlight>,
    fetcher: Option<Fetcher>,
    observers: usize,
    last_used: Option<Instant>,
}

impl Entry {
    /// Forget cached state but keep the observer registration, so a mounted
    /// query still refetches on later invalidations. Bumping both
    /// generations discards whatever the running fetch returns.
    fn reset(&mut self) {
        self.generation += 1;
        self.data_generation = self.generation;
        self.data = None;
        self.error = None;
        self.updated_at = None;
        self.invalidated = false;
        self.in_flight = None;
    }

    fn is_collectable(&self, gc_time: Duration) -> bool {
        self.observers == 0
            && self.in_flight.is_none()
            && self.last_used.map(|t| t.elapsed() >= gc_time).unwrap_or(true)
    }

    fn fresh_data(&self, stale_time: Duration) -> Option<QueryData> {
        if self.invalidated {
            return None;
        }
        let age = self.updated_at?.elapsed();
        if age < stale_time {
            self.data.clone()
        } else {
            None
        }
    }

    fn current_fetch(&self) -> Option<SharedFetch> {
        self.in_flight
            .as_ref()
            .filter(|f| f.generation == self.generation)
            .map(|f| f.future.clone())
    }
}

/// Point-in-time view of one cache entry.
#[derive(Clone)]
pub struct EntrySnapshot {
    pub data: Option<QueryData>,
    pub error: Option<AppError>,
    pub is_fetching: bool,
    pub is_stale: bool,
    pub updated_at: Option<Instant>,
    pub observers: usize,
}

// ============================================================================
// QueryClient
// ============================================================================

struct Inner {
    entries: Mutex<HashMap<QueryKey, Entry>>,
    events: broadcast::Sender<CacheEvent>,
    stale_time: Duration,
    gc_time: Duration,
    next_fetch_id: AtomicU64,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, event: CacheEvent) {
        // No subscribers is the normal case outside of UI bindings.
        let _ = self.events.send(event);
    }

    /// Record the outcome of fetch `fetch_id`, started under `generation`.
    fn complete(&self, key: &QueryKey, fetch_id: u64, generation: u64, result: &Result<QueryData, AppError>) {
        {
            let mut entries = self.lock();
            let Some(entry) = entries.get_mut(key) else {
                tracing::debug!(key = %key, "Query removed while fetching; dropping result");
                return;
            };
            if entry.in_flight.as_ref().map(|f| f.id) == Some(fetch_id) {
                entry.in_flight = None;
            }
            entry.last_used = Some(Instant::now());
            if generation < entry.data_generation {
                tracing::debug!(key = %key, "Discarding result older than cached data");
                return;
            }
            match result {
                Ok(data) => {
                    entry.data = Some(data.clone());
                    entry.data_generation = generation;
                    entry.error = None;
                    entry.updated_at = Some(Instant::now());
                    entry.invalidated = generation != entry.generation;
                    if entry.invalidated {
                        tracing::debug!(
                            key = %key,
                            "Read started before an invalidation; cached as stale"
                        );
                    }
                }
                Err(e) => {
                    if generation != entry.generation {
                        tracing::debug!(key = %key, error = %e, "Discarding error from an outdated read");
                        return;
                    }
                    entry.error = Some(e.clone());
                }
            }
        }
        self.emit(CacheEvent::Updated(key.clone()));
    }
}

/// Shared read cache for every resource hook.
///
/// Reads are deduplicated per key, fresh data is served without a network
/// call, and writes invalidate by key prefix. Fetches run as spawned tokio
/// tasks, so a caller dropping its future does not cancel the request.
#[derive(Clone)]
pub struct QueryClient {
    inner: Arc<Inner>,
}

impl QueryClient {
    pub fn new(stale_time: Duration) -> Self {
        Self::with_gc_time(stale_time, DEFAULT_GC_TIME)
    }

    /// `gc_time` bounds how long unobserved entries survive after their
    /// last read.
    pub fn with_gc_time(stale_time: Duration, gc_time: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
                events,
                stale_time,
                gc_time,
                next_fetch_id: AtomicU64::new(1),
            }),
        }
    }

    pub fn stale_time(&self) -> Duration {
        self.inner.stale_time
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.inner.events.subscribe()
    }

    /// Return fresh cached data, join the in-flight fetch for `key`, or start
    /// exactly one new fetch.
    pub async fn fetch_query(&self, key: &QueryKey, fetcher: Fetcher) -> Result<QueryData, AppError> {
        self.collect_garbage();
        let future = {
            let mut entries = self.inner.lock();
            let entry = entries.entry(key.clone()).or_default();
            entry.last_used = Some(Instant::now());
            if entry.fetcher.is_none() {
                entry.fetcher = Some(fetcher.clone());
            }
            if let Some(data) = entry.fresh_data(self.inner.stale_time) {
                tracing::debug!(key = %key, "Query cache hit");
                return Ok(data);
            }
            match entry.current_fetch() {
                Some(future) => {
                    tracing::debug!(key = %key, "Joining in-flight query");
                    future
                }
                None => self.start_fetch(key, entry, fetcher),
            }
        };
        future.await
    }

    /// Like [`fetch_query`](Self::fetch_query) but ignores freshness. Still
    /// joins a fetch already running for the current generation.
    pub async fn refetch_query(&self, key: &QueryKey, fetcher: Fetcher) -> Result<QueryData, AppError> {
        let future = {
            let mut entries = self.inner.lock();
            let entry = entries.entry(key.clone()).or_default();
            match entry.current_fetch() {
                Some(future) => future,
                None => self.start_fetch(key, entry, fetcher),
            }
        };
        future.await
    }

    /// Spawn the fetch task and register it as the entry's in-flight read.
    /// Called with the entries lock held; the task only locks on completion.
    fn start_fetch(&self, key: &QueryKey, entry: &mut Entry, fetcher: Fetcher) -> SharedFetch {
        let fetch_id = self.inner.next_fetch_id.fetch_add(1, Ordering::Relaxed);
        let generation = entry.generation;
        tracing::debug!(key = %key, fetch_id, generation, "Query cache miss; fetching");

        let inner = Arc::clone(&self.inner);
        let task_key = key.clone();
        let task = tokio::spawn(async move {
            let result = fetcher().await;
            inner.complete(&task_key, fetch_id, generation, &result);
            result
        });

        let future: SharedFetch = async move {
            task.await
                .map_err(|e| AppError::Internal(format!("query task failed: {e}")))?
        }
        .boxed()
        .shared();

        entry.in_flight = Some(InFlight {
            id: fetch_id,
            generation,
            future: future.clone(),
        });
        future
    }

    /// Mark every entry under `prefix` stale and refetch the ones that still
    /// have observers. Returns the number of entries invalidated.
    ///
    /// Must run inside a tokio runtime when observed entries match.
    pub fn invalidate_queries(&self, prefix: &QueryKey) -> usize {
        let mut invalidated = Vec::new();
        {
            let mut entries = self.inner.lock();
            for (key, entry) in entries.iter_mut().filter(|(k, _)| k.starts_with(prefix)) {
                entry.invalidated = true;
                entry.generation += 1;
                invalidated.push(key.clone());
                if entry.observers > 0 {
                    if let Some(fetcher) = entry.fetcher.clone() {
                        // The task runs to completion on its own; the
                        // handle stays reachable through `in_flight`.
                        let _ = self.start_fetch(key, entry, fetcher);
                    }
                }
            }
        }
        tracing::debug!(prefix = %prefix, count = invalidated.len(), "Invalidated queries");
        let count = invalidated.len();
        for key in invalidated {
            self.inner.emit(CacheEvent::Invalidated(key));
        }
        count
    }

    /// Drop every entry under `prefix`. In-flight reads resolve their callers
    /// but no longer populate the cache. Observed entries are emptied rather
    /// than dropped so their queries stay registered.
    pub fn remove_queries(&self, prefix: &QueryKey) -> usize {
        let removed = self.remove_where(|k| k.starts_with(prefix));
        tracing::debug!(prefix = %prefix, count = removed, "Removed queries");
        removed
    }

    /// Drop everything (logout).
    pub fn clear(&self) {
        let removed = self.remove_where(|_| true);
        tracing::debug!(count = removed, "Query cache cleared");
    }

    /// Drop unobserved, idle entries not read within the gc time. Runs on
    /// every [`fetch_query`](Self::fetch_query).
    pub fn collect_garbage(&self) -> usize {
        let gc_time = self.inner.gc_time;
        let removed: Vec<QueryKey> = {
            let mut entries = self.inner.lock();
            let keys: Vec<QueryKey> = entries
                .iter()
                .filter(|(_, e)| e.is_collectable(gc_time))
                .map(|(k, _)| k.clone())
                .collect();
            for key in &keys {
                entries.remove(key);
            }
            keys
        };
        if !removed.is_empty() {
            tracing::debug!(count = removed.len(), "Collected idle queries");
        }
        let count = removed.len();
        for key in removed {
            self.inner.emit(CacheEvent::Removed(key));
        }
        count
    }

    fn remove_where(&self, matches: impl Fn(&QueryKey) -> bool) -> usize {
        let removed: Vec<QueryKey> = {
            let mut entries = self.inner.lock();
            let keys: Vec<QueryKey> = entries.keys().filter(|k| matches(k)).cloned().collect();
            for key in &keys {
                let observed = entries.get(key).map(|e| e.observers > 0).unwrap_or(false);
                if observed {
                    if let Some(entry) = entries.get_mut(key) {
                        entry.reset();
                    }
                } else {
                    entries.remove(key);
                }
            }
            keys
        };
        let count = removed.len();
        for key in removed {
            self.inner.emit(CacheEvent::Removed(key));
        }
        count
    }

    pub fn get_query_data<T: Any + Send + Sync>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let data = self.inner.lock().get(key)?.data.clone()?;
        data.downcast::<T>().ok()
    }

    /// Seed or overwrite an entry as fresh data under its current generation.
    pub fn set_query_data<T: Any + Send + Sync>(&self, key: &QueryKey, value: T) {
        {
            let mut entries = self.inner.lock();
            let entry = entries.entry(key.clone()).or_default();
            entry.data = Some(Arc::new(value));
            entry.data_generation = entry.generation;
            entry.error = None;
            entry.updated_at = Some(Instant::now());
            entry.last_used = entry.updated_at;
            entry.invalidated = false;
        }
        self.inner.emit(CacheEvent::Updated(key.clone()));
    }

    pub fn snapshot(&self, key: &QueryKey) -> Option<EntrySnapshot> {
        let entries = self.inner.lock();
        let entry = entries.get(key)?;
        let is_stale = entry.invalidated
            || entry
                .updated_at
                .map(|t| t.elapsed() >= self.inner.stale_time)
                .unwrap_or(true);
        Some(EntrySnapshot {
            data: entry.data.clone(),
            error: entry.error.clone(),
            is_fetching: entry.in_flight.is_some(),
            is_stale,
            updated_at: entry.updated_at,
            observers: entry.observers,
        })
    }

    pub fn is_invalidated(&self, key: &QueryKey) -> bool {
        self.inner.lock().get(key).map(|e| e.invalidated).unwrap_or(false)
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.inner.lock().contains_key(key)
    }

    pub(crate) fn add_observer(&self, key: &QueryKey, fetcher: Fetcher) {
        let mut entries = self.inner.lock();
        let entry = entries.entry(key.clone()).or_default();
        entry.observers += 1;
        entry.fetcher = Some(fetcher);
    }

    pub(crate) fn remove_observer(&self, key: &QueryKey) {
        if let Some(entry) = self.inner.lock().get_mut(key) {
            entry.observers = entry.observers.saturating_sub(1);
        }
    }
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}
