//! Shared containers for one application run.

use crate::catalog::{Catalog, ProductApi};
use crate::config::Config;
use crate::format::DEFAULT_CURRENCY;
use crate::query::QueryClient;
use crate::remote::{RemoteClient, RemoteError};
use crate::storage::{Storage, CURRENCY_KEY};

/// Owns the query cache, the catalog bindings and persisted preferences.
///
/// Built once at startup and passed to whatever needs it; [`shutdown`]
/// drops all cached data.
///
/// [`shutdown`]: AppContext::shutdown
pub struct AppContext {
    config: Config,
    query_client: QueryClient,
    catalog: Catalog,
    storage: Storage,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self, RemoteError> {
        let remote = RemoteClient::new(&config.api)?;
        let query_client = QueryClient::new(&config.cache);
        let catalog = Catalog::new(query_client.clone(), ProductApi::new(remote), &config.cache);
        let storage = Storage::new(config.storage.resolved_path());

        tracing::debug!(
            base_url = %config.api.base_url,
            storage = %storage.path().display(),
            "Application context ready"
        );

        Ok(Self {
            config,
            query_client,
            catalog,
            storage,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn query_client(&self) -> &QueryClient {
        &self.query_client
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Stored display currency, `USD` when unset.
    pub fn currency(&self) -> String {
        self.storage
            .get_or(CURRENCY_KEY, DEFAULT_CURRENCY.to_string())
    }

    pub fn shutdown(self) {
        let cached = self.query_client.len();
        self.query_client.clear();
        tracing::debug!(cached, "Application context shut down");
    }
}
