//! Process-wide query cache.
//!
//! Entries are keyed by [`QueryKey`] and publish their state through a
//! `watch` channel. Each issued fetch takes the next generation number of
//! its entry; a completed fetch is applied only if its generation is still
//! the entry's current one, so a request superseded by a refetch or an
//! invalidation can never overwrite newer data.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::config::CacheConfig;
use crate::query::key::QueryKey;
use crate::query::state::{AnyData, QueryState, QueryStatus};
use crate::query::subscription::QuerySubscription;
use crate::remote::RemoteError;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

type ErasedFetcher = Arc<dyn Fn() -> BoxFuture<Result<AnyData, RemoteError>> + Send + Sync>;

const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Per-query behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Data younger than this is served without refetching.
    pub stale_time: Duration,
    /// Extra attempts for retryable errors.
    pub retry: u32,
    /// Backoff base; attempt `n` waits `retry_delay * 2^n`, capped at 30s.
    pub retry_delay: Duration,
}

impl QueryOptions {
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            stale_time: config.stale_time(),
            retry: config.max_retries,
            retry_delay: config.retry_backoff_base(),
        }
    }

    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    pub fn with_retry(mut self, retry: u32) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

struct QueryEntry {
    state: watch::Sender<QueryState>,
    fetcher: Option<ErasedFetcher>,
    options: QueryOptions,
    generation: u64,
    invalidated: bool,
    /// Generation current when the entry was last invalidated. Fetches up
    /// to and including it were issued before the invalidation.
    invalidated_at: u64,
    subscribers: usize,
    inactive_since: Option<Instant>,
}

impl QueryEntry {
    fn new(options: QueryOptions) -> Self {
        let (state, _) = watch::channel(QueryState::default());
        Self {
            state,
            fetcher: None,
            options,
            generation: 0,
            invalidated: false,
            invalidated_at: 0,
            subscribers: 0,
            inactive_since: None,
        }
    }

    fn is_fetching(&self) -> bool {
        self.state.borrow().fetching
    }

    /// The fetch in flight was issued before the last invalidation and
    /// cannot satisfy a new subscriber.
    fn fetch_predates_invalidation(&self) -> bool {
        self.invalidated && self.generation <= self.invalidated_at
    }

    fn is_stale(&self, now: Instant) -> bool {
        if self.invalidated {
            return true;
        }
        let state = self.state.borrow();
        match (state.status, state.updated_at) {
            (QueryStatus::Success, Some(updated_at)) => {
                now.duration_since(updated_at) >= self.options.stale_time
            }
            _ => true,
        }
    }

    fn apply(&mut self, key: &QueryKey, result: Result<AnyData, RemoteError>) {
        let now = Instant::now();
        match result {
            Ok(data) => {
                // Data read before an invalidation is kept but stays stale.
                if self.generation > self.invalidated_at {
                    self.invalidated = false;
                }
                self.state.send_modify(|state| {
                    state.status = QueryStatus::Success;
                    state.data = Some(data);
                    state.error = None;
                    state.fetching = false;
                    state.updated_at = Some(now);
                });
                tracing::debug!(key = %key, generation = self.generation, "Query fetch succeeded");
            }
            Err(error) => {
                tracing::warn!(
                    key = %key,
                    generation = self.generation,
                    error = %error,
                    "Query fetch failed, keeping previous data"
                );
                self.state.send_modify(|state| {
                    state.status = QueryStatus::Error;
                    state.error = Some(error);
                    state.fetching = false;
                });
            }
        }
    }
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<QueryKey, QueryEntry>,
}

/// Shared query cache handle. Clones refer to the same cache.
#[derive(Clone)]
pub struct QueryClient {
    inner: Arc<Mutex<CacheInner>>,
    defaults: QueryOptions,
    gc_time: Duration,
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

impl QueryClient {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheInner::default())),
            defaults: QueryOptions::from_config(config),
            gc_time: config.gc_time(),
        }
    }

    /// Options derived from the cache configuration.
    pub fn default_options(&self) -> QueryOptions {
        self.defaults
    }

    /// Subscribes to `key`, fetching only when needed.
    ///
    /// - Fresh data is served as is.
    /// - A fetch already in flight is joined, not duplicated, unless it was
    ///   issued before the last invalidation.
    /// - Otherwise `fetcher` is called on a spawned task.
    ///
    /// `fetcher` becomes the entry's fetcher for later refetches and
    /// invalidations. Must be called from within a Tokio runtime.
    pub fn subscribe<T, F, Fut>(
        &self,
        key: QueryKey,
        fetcher: F,
        options: QueryOptions,
    ) -> QuerySubscription<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, RemoteError>> + Send + 'static,
    {
        self.collect_garbage();

        let receiver = {
            let mut cache = self.inner.lock();
            let entry = cache.entries.entry(key.clone()).or_insert_with(|| {
                tracing::debug!(key = %key, "Creating query cache entry");
                QueryEntry::new(options)
            });

            entry.fetcher = Some(erase(fetcher));
            entry.options = options;
            entry.subscribers += 1;
            entry.inactive_since = None;
            let receiver = entry.state.subscribe();

            if entry.is_fetching() && !entry.fetch_predates_invalidation() {
                tracing::trace!(key = %key, generation = entry.generation, "Joining in-flight fetch");
            } else if entry.is_stale(Instant::now()) {
                spawn_fetch(&self.inner, &key, entry, "mount");
            } else {
                tracing::trace!(key = %key, "Serving fresh cached data");
            }

            receiver
        };

        QuerySubscription::new(self.clone(), key, receiver)
    }

    /// Subscribes, waits for the fetch to settle, and returns the data.
    pub async fn fetch<T, F, Fut>(
        &self,
        key: QueryKey,
        fetcher: F,
        options: QueryOptions,
    ) -> Result<Arc<T>, RemoteError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, RemoteError>> + Send + 'static,
    {
        let mut subscription = self.subscribe(key, fetcher, options);
        let snapshot = subscription.settled().await;

        if let Some(error) = snapshot.error.filter(|_| snapshot.status == QueryStatus::Error) {
            return Err(error);
        }
        snapshot.data.ok_or_else(|| {
            RemoteError::network(format!(
                "Query {} has no data of the requested type",
                subscription.key()
            ))
        })
    }

    /// Forces a new fetch for `key`, superseding any fetch in flight.
    /// Returns false when the key is not cached.
    pub fn refetch(&self, key: &QueryKey) -> bool {
        let mut cache = self.inner.lock();
        let Some(entry) = cache.entries.get_mut(key) else {
            return false;
        };
        spawn_fetch(&self.inner, key, entry, "refetch");
        true
    }

    /// Marks every entry under `prefix` stale.
    ///
    /// Entries with subscribers refetch immediately; the others refetch on
    /// their next subscribe. Returns the number of entries matched.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut cache = self.inner.lock();
        let mut matched = 0;

        for (key, entry) in cache
            .entries
            .iter_mut()
            .filter(|(key, _)| key.starts_with(prefix))
        {
            matched += 1;
            entry.invalidated = true;
            entry.invalidated_at = entry.generation;
            if entry.subscribers > 0 {
                spawn_fetch(&self.inner, key, entry, "invalidate");
            } else {
                tracing::debug!(key = %key, "Marked inactive query stale");
            }
        }

        tracing::debug!(prefix = %prefix, matched, "Invalidated queries");
        matched
    }

    /// Cached data for `key`, if present and of type `T`.
    pub fn get_query_data<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let cache = self.inner.lock();
        let data = cache.entries.get(key)?.state.borrow().data.clone()?;
        data.downcast::<T>().ok()
    }

    pub fn query_status(&self, key: &QueryKey) -> Option<QueryStatus> {
        let cache = self.inner.lock();
        let status = cache.entries.get(key)?.state.borrow().status;
        Some(status)
    }

    /// Current fetch generation of `key`.
    pub fn generation(&self, key: &QueryKey) -> Option<u64> {
        self.inner.lock().entries.get(key).map(|entry| entry.generation)
    }

    pub fn subscriber_count(&self, key: &QueryKey) -> usize {
        self.inner
            .lock()
            .entries
            .get(key)
            .map_or(0, |entry| entry.subscribers)
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.inner.lock().entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes entries that have had no subscribers for the retention window.
    pub fn collect_garbage(&self) -> usize {
        sweep(&self.inner, self.gc_time)
    }

    /// Drops every entry. Fetches still in flight complete into nothing.
    pub fn clear(&self) {
        let mut cache = self.inner.lock();
        let removed = cache.entries.len();
        cache.entries.clear();
        tracing::debug!(removed, "Query cache cleared");
    }

    pub(crate) fn release(&self, key: &QueryKey) {
        let now_idle = {
            let mut cache = self.inner.lock();
            match cache.entries.get_mut(key) {
                Some(entry) => {
                    entry.subscribers = entry.subscribers.saturating_sub(1);
                    if entry.subscribers == 0 {
                        entry.inactive_since = Some(Instant::now());
                        true
                    } else {
                        false
                    }
                }
                None => false,
            }
        };

        if now_idle {
            tracing::trace!(key = %key, "Query has no subscribers");
            self.schedule_gc();
        }
    }

    fn schedule_gc(&self) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let inner: Weak<Mutex<CacheInner>> = Arc::downgrade(&self.inner);
        let gc_time = self.gc_time;
        let deadline = Instant::now() + gc_time;
        handle.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if let Some(inner) = inner.upgrade() {
                sweep(&inner, gc_time);
            }
        });
    }
}

fn erase<T, F, Fut>(fetcher: F) -> ErasedFetcher
where
    T: Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, RemoteError>> + Send + 'static,
{
    Arc::new(move || {
        let fut = fetcher();
        Box::pin(async move { fut.await.map(|data| Arc::new(data) as AnyData) })
            as BoxFuture<Result<AnyData, RemoteError>>
    })
}

fn spawn_fetch(
    inner: &Arc<Mutex<CacheInner>>,
    key: &QueryKey,
    entry: &mut QueryEntry,
    reason: &'static str,
) {
    let Some(fetcher) = entry.fetcher.clone() else {
        tracing::debug!(key = %key, "No fetcher registered, leaving entry stale");
        return;
    };

    entry.generation += 1;
    let generation = entry.generation;
    let options = entry.options;
    entry.state.send_modify(|state| {
        state.fetching = true;
        if state.data.is_none() {
            state.status = QueryStatus::Loading;
        }
    });
    tracing::debug!(key = %key, generation, reason, "Fetching query");

    let inner = Arc::clone(inner);
    let key = key.clone();
    tokio::spawn(async move {
        let result = fetch_with_retry(&fetcher, options, &key).await;

        let mut cache = inner.lock();
        let Some(entry) = cache.entries.get_mut(&key) else {
            tracing::debug!(key = %key, generation, "Query entry removed before fetch completed");
            return;
        };
        if entry.generation != generation {
            tracing::debug!(
                key = %key,
                generation,
                current = entry.generation,
                "Discarding superseded fetch result"
            );
            return;
        }
        entry.apply(&key, result);
    });
}

async fn fetch_with_retry(
    fetcher: &ErasedFetcher,
    options: QueryOptions,
    key: &QueryKey,
) -> Result<AnyData, RemoteError> {
    let mut attempt = 0u32;
    loop {
        match fetcher().await {
            Ok(data) => return Ok(data),
            Err(error) if attempt < options.retry && error.is_retryable() => {
                let delay = retry_delay(options.retry_delay, attempt);
                tracing::debug!(
                    key = %key,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Retrying query fetch"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}

fn retry_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
        .min(MAX_RETRY_DELAY)
}

fn sweep(inner: &Mutex<CacheInner>, gc_time: Duration) -> usize {
    let now = Instant::now();
    let mut cache = inner.lock();
    let before = cache.entries.len();
    cache.entries.retain(|key, entry| {
        let expired = entry.subscribers == 0
            && !entry.is_fetching()
            && entry
                .inactive_since
                .is_some_and(|since| now.duration_since(since) >= gc_time);
        if expired {
            tracing::debug!(key = %key, "Collecting inactive query");
        }
        !expired
    });
    before - cache.entries.len()
}
