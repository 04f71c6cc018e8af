//! Write operations with observable status.
//!
//! A [`Mutation`] wraps one create/update/delete call. Each `execute`
//! moves the state `idle -> pending -> success | error`; on success the
//! configured key prefixes are invalidated in the query cache, on error the
//! cache is left untouched.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::observer::{Observable, Subscription};
use crate::query::{BoxFuture, QueryClient, QueryKey};
use crate::remote::RemoteError;

type MutateFn<V, T> = Arc<dyn Fn(V) -> BoxFuture<Result<T, RemoteError>> + Send + Sync>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MutationStatus {
    #[default]
    Idle,
    Pending,
    Success,
    Error,
}

/// State of the latest invocation.
#[derive(Debug)]
pub struct MutationState<T> {
    pub status: MutationStatus,
    pub data: Option<Arc<T>>,
    pub error: Option<RemoteError>,
}

impl<T> Clone for MutationState<T> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
        }
    }
}

impl<T> Default for MutationState<T> {
    fn default() -> Self {
        Self {
            status: MutationStatus::Idle,
            data: None,
            error: None,
        }
    }
}

impl<T> MutationState<T> {
    fn pending() -> Self {
        Self {
            status: MutationStatus::Pending,
            ..Self::default()
        }
    }

    fn succeeded(data: Arc<T>) -> Self {
        Self {
            status: MutationStatus::Success,
            data: Some(data),
            error: None,
        }
    }

    fn failed(error: RemoteError) -> Self {
        Self {
            status: MutationStatus::Error,
            data: None,
            error: Some(error),
        }
    }
}

/// Executes a write and invalidates dependent queries on success.
pub struct Mutation<V, T> {
    name: &'static str,
    client: QueryClient,
    mutate: MutateFn<V, T>,
    invalidates: Vec<QueryKey>,
    state: Observable<MutationState<T>>,
    invocations: Arc<AtomicU64>,
}

impl<V, T> Clone for Mutation<V, T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            client: self.client.clone(),
            mutate: Arc::clone(&self.mutate),
            invalidates: self.invalidates.clone(),
            state: self.state.clone(),
            invocations: Arc::clone(&self.invocations),
        }
    }
}

impl<V, T> Mutation<V, T>
where
    V: Send + 'static,
    T: Send + Sync + 'static,
{
    pub fn new<F, Fut>(name: &'static str, client: QueryClient, mutate: F) -> Self
    where
        F: Fn(V) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, RemoteError>> + Send + 'static,
    {
        Self {
            name,
            client,
            mutate: Arc::new(move |variables| {
                Box::pin(mutate(variables)) as BoxFuture<Result<T, RemoteError>>
            }),
            invalidates: Vec::new(),
            state: Observable::new(MutationState::default()),
            invocations: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Key prefixes invalidated after every successful invocation.
    pub fn invalidates<I>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = QueryKey>,
    {
        self.invalidates.extend(prefixes);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn state(&self) -> MutationState<T> {
        self.state.get()
    }

    pub fn status(&self) -> MutationStatus {
        self.state.get().status
    }

    pub fn is_pending(&self) -> bool {
        self.status() == MutationStatus::Pending
    }

    /// Listener is called on every status transition.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&MutationState<T>) + Send + Sync + 'static,
    {
        self.state.subscribe(listener)
    }

    /// Back to idle, dropping the last result or error.
    pub fn reset(&self) {
        self.state.set(MutationState::default());
    }

    /// Runs the write. No retries; the caller decides whether to try again.
    ///
    /// If a newer invocation started meanwhile, this one's outcome is still
    /// returned (and still invalidates on success) but is not published as
    /// the mutation state.
    pub async fn execute(&self, variables: V) -> Result<Arc<T>, RemoteError> {
        let invocation = self.invocations.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.set(MutationState::pending());
        tracing::debug!(mutation = self.name, invocation, "Mutation started");

        let result = (self.mutate)(variables).await;
        let latest = self.invocations.load(Ordering::SeqCst) == invocation;
        if !latest {
            tracing::debug!(mutation = self.name, invocation, "Mutation superseded by a newer invocation");
        }

        match result {
            Ok(data) => {
                let data = Arc::new(data);
                for prefix in &self.invalidates {
                    self.client.invalidate(prefix);
                }
                tracing::info!(mutation = self.name, invocation, "Mutation succeeded");
                if latest {
                    self.state.set(MutationState::succeeded(Arc::clone(&data)));
                }
                Ok(data)
            }
            Err(error) => {
                tracing::warn!(mutation = self.name, invocation, error = %error, "Mutation failed");
                if latest {
                    self.state.set(MutationState::failed(error.clone()));
                }
                Err(error)
            }
        }
    }
}
