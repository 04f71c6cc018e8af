use crate::ui::form::intent::FormIntent;
use crate::ui::form::state::FormState;
use crate::ui::mvi::Reducer;

pub struct FormReducer;

impl Reducer for FormReducer {
    type State = FormState;
    type Intent = FormIntent;

    fn reduce(mut state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            FormIntent::UpdateField { field, value } => {
                if !state.draft.set(field, value) {
                    tracing::warn!(field = %field, "Ignoring value of the wrong kind for form field");
                    return state;
                }
                state.dirty = true;
                // Only the edited field; the rest wait for the next validate.
                state.errors.remove(&field);
                state
            }
            FormIntent::Validate => {
                state.errors = state.draft.validate();
                state
            }
            FormIntent::Reset => FormState::default(),
            FormIntent::Load(draft) => FormState {
                draft,
                ..FormState::default()
            },
            FormIntent::SetError { field, message } => {
                state.errors.insert(field, message);
                state
            }
            FormIntent::ClearError(field) => {
                state.errors.remove(&field);
                state
            }
            FormIntent::ClearErrors => {
                state.errors.clear();
                state
            }
            FormIntent::SetSubmitting(submitting) => {
                state.submitting = submitting;
                state
            }
        }
    }
}
