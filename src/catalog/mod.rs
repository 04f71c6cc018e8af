//! Product catalog: model, endpoints, cache bindings and UI workflows.

pub mod api;
pub mod keys;
mod model;
pub mod queries;
pub mod workflow;

pub use api::ProductApi;
pub use model::{Product, ProductCategory, ProductList, ProductPayload, UnknownCategory, UpdateProduct};
pub use queries::{Catalog, CreateProduct, DeleteProduct, EditProduct};
pub use workflow::{confirm_delete, submit_form, DeleteOutcome, SubmitOutcome};
