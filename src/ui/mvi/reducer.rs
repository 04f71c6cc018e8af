use super::intent::Intent;
use super::state::UiState;

/// Pure transition function of a store.
///
/// `reduce` receives the current state by value and returns the next one.
/// Returning an equal state means "nothing happened": the store publishes
/// nothing. Side effects (requests, cache writes) belong to the caller.
pub trait Reducer {
    type State: UiState;
    type Intent: Intent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State;
}
