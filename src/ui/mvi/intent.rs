//! Intents: the only way view state changes.

use std::fmt::Debug;

/// An event a [`Store`](super::Store) can dispatch: a field edit, a dialog
/// opening or closing, a submission starting or ending.
///
/// `Debug` is required so every dispatch can be traced.
pub trait Intent: Debug + Send + 'static {}
