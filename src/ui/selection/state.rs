use std::sync::Arc;

use crate::catalog::Product;
use crate::ui::mvi::UiState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modal {
    Create,
    Edit,
    Delete,
}

/// Which product is targeted and which dialogs are open.
///
/// The selected product shares the cached snapshot; it is never copied.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    pub selected: Option<Arc<Product>>,
    pub show_create: bool,
    pub show_edit: bool,
    pub show_delete: bool,
}

impl UiState for SelectionState {}

// Identity comparison for the selection: a refetched snapshot of the same
// product is a different selection.
impl PartialEq for SelectionState {
    fn eq(&self, other: &Self) -> bool {
        let same_selection = match (&self.selected, &other.selected) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_selection
            && self.show_create == other.show_create
            && self.show_edit == other.show_edit
            && self.show_delete == other.show_delete
    }
}

impl SelectionState {
    pub fn is_open(&self, modal: Modal) -> bool {
        match modal {
            Modal::Create => self.show_create,
            Modal::Edit => self.show_edit,
            Modal::Delete => self.show_delete,
        }
    }

    pub fn any_open(&self) -> bool {
        self.show_create || self.show_edit || self.show_delete
    }

    pub(crate) fn set_open(&mut self, modal: Modal, open: bool) {
        match modal {
            Modal::Create => self.show_create = open,
            Modal::Edit => self.show_edit = open,
            Modal::Delete => self.show_delete = open,
        }
    }
}
