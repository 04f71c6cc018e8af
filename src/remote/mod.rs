//! Remote resource client.
//!
//! Thin typed wrapper over `reqwest` for the catalog's JSON API.

mod client;
mod error;

pub use client::RemoteClient;
pub use error::{ErrorPayload, RemoteError};
