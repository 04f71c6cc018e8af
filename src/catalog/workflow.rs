//! Form submission and delete confirmation flows.
//!
//! These tie the view-state containers to the mutations: the form decides
//! whether a write may happen, the mutation performs it, and the selection
//! store is reset once a delete dialog is done.

use std::sync::Arc;

use scopeguard::ScopeGuard;

use crate::catalog::model::{Product, ProductPayload};
use crate::mutation::Mutation;
use crate::remote::RemoteError;
use crate::ui::form::{FieldErrors, FormStore};
use crate::ui::selection::SelectionStore;

#[derive(Debug)]
pub enum SubmitOutcome<T> {
    /// Local validation failed; nothing was sent.
    Invalid(FieldErrors),
    Saved(Arc<T>),
    Failed(RemoteError),
}

impl<T> SubmitOutcome<T> {
    pub fn is_saved(&self) -> bool {
        matches!(self, SubmitOutcome::Saved(_))
    }
}

/// Validates the form and, if valid, runs `mutation` with the draft.
///
/// Errors are cleared and recomputed first; an invalid draft never reaches
/// the network. While the write runs the form is marked submitting. On
/// success the form is reset, on failure only the submitting flag drops.
/// The flag is also dropped if this future is cancelled mid-write.
pub async fn submit_form<V, T, F>(
    form: &FormStore,
    mutation: &Mutation<V, T>,
    to_variables: F,
) -> SubmitOutcome<T>
where
    V: Send + 'static,
    T: Send + Sync + 'static,
    F: FnOnce(ProductPayload) -> V,
{
    form.clear_errors();
    if !form.validate() {
        let errors = form.errors();
        tracing::debug!(invalid = errors.len(), "Form submission blocked by validation");
        return SubmitOutcome::Invalid(errors);
    }

    let payload = match form.draft().to_payload() {
        Ok(payload) => payload,
        Err(errors) => return SubmitOutcome::Invalid(errors),
    };

    form.set_submitting(true);
    let guard = scopeguard::guard(form.clone(), |form| form.set_submitting(false));

    match mutation.execute(to_variables(payload)).await {
        Ok(saved) => {
            // Reset already clears submitting.
            let form = ScopeGuard::into_inner(guard);
            form.reset();
            SubmitOutcome::Saved(saved)
        }
        Err(error) => {
            drop(guard);
            SubmitOutcome::Failed(error)
        }
    }
}

#[derive(Debug)]
pub enum DeleteOutcome {
    Deleted(Arc<Product>),
    Failed(RemoteError),
    NothingSelected,
}

/// Deletes the selected product. Dialogs and selection are reset whatever
/// the outcome.
pub async fn confirm_delete(
    selection: &SelectionStore,
    mutation: &Mutation<String, ()>,
) -> DeleteOutcome {
    let Some(product) = selection.selected() else {
        selection.reset_all();
        return DeleteOutcome::NothingSelected;
    };

    let outcome = match mutation.execute(product.id.clone()).await {
        Ok(_) => DeleteOutcome::Deleted(product),
        Err(error) => {
            tracing::warn!(id = %product.id, error = %error, "Deleting product failed");
            DeleteOutcome::Failed(error)
        }
    };

    selection.reset_all();
    outcome
}

/// Prefills the form from `product` and opens the edit dialog for it.
pub fn begin_edit(form: &FormStore, selection: &SelectionStore, product: Arc<Product>) {
    form.load(&product);
    selection.select(Some(product));
    selection.open_edit();
}

/// Opens the delete confirmation for `product`.
pub fn begin_delete(selection: &SelectionStore, product: Arc<Product>) {
    selection.select(Some(product));
    selection.open_delete();
}

pub fn created_message(product: &Product) -> String {
    format!("Product \"{}\" created successfully!", product.name)
}

pub fn updated_message(product: &Product) -> String {
    format!("Product \"{}\" updated successfully!", product.name)
}

pub fn deleted_message(product: &Product) -> String {
    format!("Product \"{}\" deleted successfully!", product.name)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use parking_lot::Mutex;
    use rust_decimal::Decimal;

    use super::*;
    use crate::catalog::ProductCategory;
    use crate::mutation::MutationStatus;
    use crate::query::QueryClient;
    use crate::ui::form::{FormField, FormState, PRICE_INVALID};

    fn fill(form: &FormStore, price: &str) {
        form.update_field(FormField::Name, "Soup");
        form.update_field(FormField::Description, "Hot soup");
        form.update_field(FormField::Price, price);
        form.update_field(FormField::Category, "APPETIZER");
    }

    fn echo_mutation(calls: Arc<AtomicUsize>) -> Mutation<ProductPayload, Product> {
        Mutation::new("create", QueryClient::default(), move |payload: ProductPayload| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                Ok(Product {
                    id: "1".to_string(),
                    name: payload.name,
                    description: payload.description,
                    price: payload.price,
                    category: payload.category,
                    image_url: payload.image_url,
                    is_available: payload.is_available,
                    created_at: None,
                    updated_at: None,
                })
            }
        })
    }

    fn tea() -> Arc<Product> {
        Arc::new(Product {
            id: "5".to_string(),
            name: "Tea".to_string(),
            description: "Green".to_string(),
            price: Decimal::new(250, 2),
            category: ProductCategory::Beverage,
            image_url: None,
            is_available: true,
            created_at: None,
            updated_at: None,
        })
    }

    #[tokio::test]
    async fn zero_price_is_rejected_without_calling_the_server() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mutation = echo_mutation(Arc::clone(&calls));
        let form = FormStore::new();
        fill(&form, "0");

        let outcome = submit_form(&form, &mutation, |payload| payload).await;

        match outcome {
            SubmitOutcome::Invalid(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[&FormField::Price], PRICE_INVALID);
            }
            other => panic!("expected invalid, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(mutation.status(), MutationStatus::Idle);
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn success_resets_form_with_one_submitting_drop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mutation = echo_mutation(Arc::clone(&calls));
        let form = FormStore::new();
        fill(&form, "4.50");

        let transitions = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&transitions);
        let _sub = form.subscribe(move |state: &FormState| sink.lock().push(state.submitting));

        let outcome = submit_form(&form, &mutation, |payload| payload).await;

        let SubmitOutcome::Saved(product) = outcome else {
            panic!("expected saved");
        };
        assert_eq!(product.price, Decimal::new(450, 2));
        assert_eq!(created_message(&product), "Product \"Soup\" created successfully!");
        assert_eq!(form.state(), FormState::default());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // clear + validate publish nothing new; then true, then reset to false.
        assert_eq!(*transitions.lock(), vec![true, false]);
    }

    #[tokio::test]
    async fn failure_keeps_draft_and_clears_submitting() {
        let mutation: Mutation<ProductPayload, Product> =
            Mutation::new("create", QueryClient::default(), |_| async {
                Err(RemoteError::new("Duplicate name", Some(409)))
            });
        let form = FormStore::new();
        fill(&form, "4.50");

        let outcome = submit_form(&form, &mutation, |payload| payload).await;

        assert!(matches!(outcome, SubmitOutcome::Failed(ref e) if e.status == Some(409)));
        assert!(!form.is_submitting());
        assert_eq!(form.draft().name, "Soup");
        assert_eq!(mutation.status(), MutationStatus::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_submit_still_clears_submitting() {
        let mutation: Mutation<ProductPayload, Product> =
            Mutation::new("create", QueryClient::default(), |_| async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Err(RemoteError::network("never"))
            });
        let form = FormStore::new();
        fill(&form, "4.50");

        let cancelled = tokio::time::timeout(
            Duration::from_secs(1),
            submit_form(&form, &mutation, |payload| payload),
        )
        .await;

        assert!(cancelled.is_err());
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn delete_resets_modals_on_success_and_failure() {
        let selection = SelectionStore::new();
        let ok: Mutation<String, ()> =
            Mutation::new("delete", QueryClient::default(), |_| async { Ok(()) });
        begin_delete(&selection, tea());

        let outcome = confirm_delete(&selection, &ok).await;
        let DeleteOutcome::Deleted(product) = outcome else {
            panic!("expected deleted");
        };
        assert_eq!(deleted_message(&product), "Product \"Tea\" deleted successfully!");
        assert!(selection.selected().is_none());
        assert!(!selection.state().any_open());

        let failing: Mutation<String, ()> = Mutation::new("delete", QueryClient::default(), |_| async {
            Err(RemoteError::new("Product not found", Some(404)))
        });
        begin_delete(&selection, tea());
        let outcome = confirm_delete(&selection, &failing).await;
        assert!(matches!(outcome, DeleteOutcome::Failed(_)));
        assert!(selection.selected().is_none());
        assert!(!selection.state().show_delete);
    }

    #[tokio::test]
    async fn delete_without_selection_does_nothing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mutation: Mutation<String, ()> = Mutation::new("delete", QueryClient::default(), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        });
        let selection = SelectionStore::new();
        selection.open_delete();

        assert!(matches!(
            confirm_delete(&selection, &mutation).await,
            DeleteOutcome::NothingSelected
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!selection.state().show_delete);
    }

    #[test]
    fn begin_edit_loads_form_and_opens_dialog() {
        let form = FormStore::new();
        let selection = SelectionStore::new();
        begin_edit(&form, &selection, tea());

        assert_eq!(form.draft().name, "Tea");
        assert!(!form.state().dirty);
        assert!(selection.state().show_edit);
        assert_eq!(selection.selected().unwrap().id, "5");
        assert_eq!(updated_message(&tea()), "Product \"Tea\" updated successfully!");
    }
}
