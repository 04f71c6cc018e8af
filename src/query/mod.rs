//! Keyed cache of server-derived data.
//!
//! Supports subscribe with serve-while-fresh, coalescing of concurrent
//! fetches, stale-if-error, prefix invalidation, manual refetch and
//! garbage collection of entries nobody watches.

mod client;
mod key;
mod state;
mod subscription;

pub use client::{BoxFuture, QueryClient, QueryOptions};
pub use key::{KeySegment, QueryKey};
pub use state::{QuerySnapshot, QueryStatus};
pub use subscription::QuerySubscription;
