//! Selected product and modal visibility.

mod intent;
mod reducer;
mod state;

pub use intent::SelectionIntent;
pub use reducer::SelectionReducer;
pub use state::{Modal, SelectionState};

use std::sync::Arc;

use crate::catalog::Product;
use crate::ui::mvi::Store;

pub type SelectionStore = Store<SelectionReducer>;

impl Store<SelectionReducer> {
    pub fn select(&self, product: Option<Arc<Product>>) {
        self.dispatch(SelectionIntent::Select(product));
    }

    pub fn selected(&self) -> Option<Arc<Product>> {
        self.state().selected
    }

    pub fn open_create(&self) {
        self.dispatch(SelectionIntent::Open(Modal::Create));
    }

    pub fn close_create(&self) {
        self.dispatch(SelectionIntent::Close(Modal::Create));
    }

    pub fn open_edit(&self) {
        self.dispatch(SelectionIntent::Open(Modal::Edit));
    }

    pub fn close_edit(&self) {
        self.dispatch(SelectionIntent::Close(Modal::Edit));
    }

    pub fn open_delete(&self) {
        self.dispatch(SelectionIntent::Open(Modal::Delete));
    }

    pub fn close_delete(&self) {
        self.dispatch(SelectionIntent::Close(Modal::Delete));
    }

    pub fn reset_all(&self) {
        self.dispatch(SelectionIntent::ResetAll);
    }
}
