use std::marker::PhantomData;

use tokio::sync::watch;

use crate::query::client::QueryClient;
use crate::query::key::QueryKey;
use crate::query::state::{QuerySnapshot, QueryState};

/// A live interest in one cache entry.
///
/// Dropping the subscription withdraws the interest; once an entry has no
/// subscribers it becomes eligible for garbage collection.
pub struct QuerySubscription<T> {
    client: QueryClient,
    key: QueryKey,
    receiver: watch::Receiver<QueryState>,
    _data: PhantomData<fn() -> T>,
}

impl<T> QuerySubscription<T> {
    pub(crate) fn new(client: QueryClient, key: QueryKey, receiver: watch::Receiver<QueryState>) -> Self {
        Self {
            client,
            key,
            receiver,
            _data: PhantomData,
        }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Starts a new fetch, superseding any fetch in flight.
    pub fn refetch(&self) {
        self.client.refetch(&self.key);
    }
}

impl<T: Send + Sync + 'static> QuerySubscription<T> {
    pub fn snapshot(&self) -> QuerySnapshot<T> {
        QuerySnapshot::from_state(&self.receiver.borrow())
    }

    /// Waits for the next published change.
    ///
    /// Returns the current snapshot immediately if the entry was removed
    /// from the cache.
    pub async fn changed(&mut self) -> QuerySnapshot<T> {
        if self.receiver.changed().await.is_err() {
            tracing::trace!(key = %self.key, "Query entry dropped while waiting for change");
        }
        self.snapshot()
    }

    /// Waits until no fetch is in flight for this entry.
    pub async fn settled(&mut self) -> QuerySnapshot<T> {
        let settled = self
            .receiver
            .wait_for(|state| !state.fetching)
            .await
            .map(|state| QuerySnapshot::from_state(&state));
        settled.unwrap_or_else(|_| self.snapshot())
    }
}

impl<T> Drop for QuerySubscription<T> {
    fn drop(&mut self) {
        self.client.release(&self.key);
    }
}
