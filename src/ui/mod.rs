//! View-state containers.

pub mod form;
pub mod mvi;
pub mod selection;
