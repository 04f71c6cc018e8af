use std::sync::Arc;

use crate::catalog::Product;
use crate::ui::mvi::Intent;
use crate::ui::selection::state::Modal;

#[derive(Debug, Clone)]
pub enum SelectionIntent {
    Select(Option<Arc<Product>>),
    Open(Modal),
    Close(Modal),
    /// Close every dialog and drop the selection in one change.
    ResetAll,
}

impl Intent for SelectionIntent {}
