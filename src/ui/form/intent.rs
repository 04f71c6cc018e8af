use crate::ui::form::state::{FieldValue, FormField, ProductDraft};
use crate::ui::mvi::Intent;

#[derive(Debug, Clone)]
pub enum FormIntent {
    /// User edited a field. Clears that field's error only.
    UpdateField { field: FormField, value: FieldValue },
    /// Replace the error map with the result of the rule set.
    Validate,
    /// Back to the documented defaults.
    Reset,
    /// Prefill for editing an existing product. Not dirty afterwards.
    Load(ProductDraft),
    SetError { field: FormField, message: String },
    ClearError(FormField),
    ClearErrors,
    SetSubmitting(bool),
}

impl Intent for FormIntent {}
