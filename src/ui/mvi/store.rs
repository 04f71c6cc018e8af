//! Observable container driven by a reducer.

use std::marker::PhantomData;

use super::reducer::Reducer;
use crate::observer::{Observable, Subscription};

/// Holds one `R::State` and applies intents through `R::reduce`.
///
/// Listeners are notified only when a dispatch produces a state that differs
/// from the previous one.
pub struct Store<R: Reducer> {
    state: Observable<R::State>,
    _reducer: PhantomData<fn() -> R>,
}

impl<R: Reducer> Clone for Store<R> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            _reducer: PhantomData,
        }
    }
}

impl<R: Reducer> Default for Store<R> {
    fn default() -> Self {
        Self::with_state(R::State::default())
    }
}

impl<R: Reducer> Store<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: R::State) -> Self {
        Self {
            state: Observable::new(state),
            _reducer: PhantomData,
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> R::State {
        self.state.get()
    }

    /// Runs the reducer. Returns whether the state changed.
    pub fn dispatch(&self, intent: R::Intent) -> bool {
        tracing::trace!(?intent, "Dispatching intent");
        self.state.update_if(|state| {
            let next = R::reduce(state.clone(), intent);
            if next == *state {
                return false;
            }
            *state = next;
            true
        })
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&R::State) + Send + Sync + 'static,
    {
        self.state.subscribe(listener)
    }
}
