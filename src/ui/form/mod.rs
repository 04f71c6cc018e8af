//! Product create/edit form.
//!
//! # Architecture
//!
//! Uses the MVI pattern:
//! - `state.rs` - Raw field values, per-field errors, dirty/submitting flags
//! - `intent.rs` - Edits, validation and lifecycle events
//! - `reducer.rs` - State transitions (pure, no side effects)
//!
//! [`FormStore`] holds one form instance per view scope.

mod intent;
mod reducer;
mod state;

pub use intent::FormIntent;
pub use reducer::FormReducer;
pub use state::{
    FieldErrors, FieldValue, FormField, FormState, ProductDraft, CATEGORY_REQUIRED,
    DESCRIPTION_REQUIRED, NAME_REQUIRED, PRICE_INVALID,
};

use crate::catalog::Product;
use crate::ui::mvi::Store;

pub type FormStore = Store<FormReducer>;

impl Store<FormReducer> {
    pub fn update_field(&self, field: FormField, value: impl Into<FieldValue>) {
        self.dispatch(FormIntent::UpdateField {
            field,
            value: value.into(),
        });
    }

    /// Recomputes every field error. Returns true when the draft is valid.
    pub fn validate(&self) -> bool {
        self.dispatch(FormIntent::Validate);
        self.state().is_valid()
    }

    pub fn reset(&self) {
        self.dispatch(FormIntent::Reset);
    }

    pub fn load(&self, product: &Product) {
        self.dispatch(FormIntent::Load(ProductDraft::from_product(product)));
    }

    pub fn set_error(&self, field: FormField, message: impl Into<String>) {
        self.dispatch(FormIntent::SetError {
            field,
            message: message.into(),
        });
    }

    pub fn clear_error(&self, field: FormField) {
        self.dispatch(FormIntent::ClearError(field));
    }

    pub fn clear_errors(&self) {
        self.dispatch(FormIntent::ClearErrors);
    }

    pub fn set_submitting(&self, submitting: bool) {
        self.dispatch(FormIntent::SetSubmitting(submitting));
    }

    pub fn draft(&self) -> ProductDraft {
        self.state().draft
    }

    pub fn errors(&self) -> FieldErrors {
        self.state().errors
    }

    pub fn is_submitting(&self) -> bool {
        self.state().submitting
    }
}
