//! Configuration loading.
//!
//! TOML file under the platform config dir, defaults for every field,
//! plus an environment override for the API base URL.

mod loader;
mod types;

pub use loader::{ConfigError, API_URL_ENV};
pub use types::{ApiConfig, CacheConfig, Config, StorageConfig};
