use crate::ui::mvi::Reducer;
use crate::ui::selection::intent::SelectionIntent;
use crate::ui::selection::state::SelectionState;

pub struct SelectionReducer;

impl Reducer for SelectionReducer {
    type State = SelectionState;
    type Intent = SelectionIntent;

    fn reduce(mut state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            SelectionIntent::Select(product) => {
                state.selected = product;
                state
            }
            SelectionIntent::Open(modal) => {
                state.set_open(modal, true);
                state
            }
            SelectionIntent::Close(modal) => {
                state.set_open(modal, false);
                state
            }
            SelectionIntent::ResetAll => SelectionState::default(),
        }
    }
}
