use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tokio::time::Instant;

use crate::remote::RemoteError;

/// Type-erased cached value. Entries for different keys hold different types.
pub(crate) type AnyData = Arc<dyn Any + Send + Sync>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueryStatus {
    /// No fetch has been issued yet.
    #[default]
    Idle,
    /// First fetch in flight, no data yet.
    Loading,
    Success,
    /// Last fetch failed. Previously fetched data, if any, is kept.
    Error,
}

/// What a cache entry publishes to its subscribers.
#[derive(Clone, Default)]
pub(crate) struct QueryState {
    pub status: QueryStatus,
    pub data: Option<AnyData>,
    pub error: Option<RemoteError>,
    pub fetching: bool,
    pub updated_at: Option<Instant>,
}

impl fmt::Debug for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryState")
            .field("status", &self.status)
            .field("has_data", &self.data.is_some())
            .field("error", &self.error)
            .field("fetching", &self.fetching)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Typed view of a cache entry at one point in time.
#[derive(Debug)]
pub struct QuerySnapshot<T> {
    pub status: QueryStatus,
    pub data: Option<Arc<T>>,
    pub error: Option<RemoteError>,
    /// A fetch (first load or background refetch) is in flight.
    pub fetching: bool,
}

impl<T> Clone for QuerySnapshot<T> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
            fetching: self.fetching,
        }
    }
}

impl<T: Send + Sync + 'static> QuerySnapshot<T> {
    pub(crate) fn from_state(state: &QueryState) -> Self {
        Self {
            status: state.status,
            data: state.data.clone().and_then(|data| data.downcast::<T>().ok()),
            error: state.error.clone(),
            fetching: state.fetching,
        }
    }
}

impl<T> QuerySnapshot<T> {
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }
}
