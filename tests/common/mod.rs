//! Shared test utilities and mock infrastructure.

#![allow(dead_code, unused_imports)]

pub mod mock_catalog;

use mock_catalog::{MockCatalog, MockProduct};
use orderme::app::AppContext;
use orderme::catalog::{Catalog, ProductApi};
use orderme::config::{CacheConfig, Config};
use orderme::query::QueryClient;
use orderme::remote::RemoteClient;
use std::net::TcpListener;
use std::time::Duration;
use tempfile::TempDir;

/// Find a port nothing listens on.
pub fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind to free port");
    listener.local_addr().unwrap().port()
}

/// Config pointing at `base_url` with fast, retry-free defaults.
pub fn test_config(base_url: &str, dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.api.base_url = base_url.to_string();
    config.api.timeout_seconds = 5;
    config.api.connect_timeout_seconds = 2;
    config.cache.max_retries = 0;
    config.cache.retry_backoff_base_ms = 10;
    config.storage.path = Some(dir.path().join("storage.json"));
    config
}

/// A running mock catalog plus an application context bound to it.
pub struct TestApp {
    pub mock: MockCatalog,
    pub app: AppContext,
    pub dir: TempDir,
}

impl TestApp {
    pub async fn start() -> Self {
        let mock = MockCatalog::start().await;
        let dir = TempDir::new().expect("Failed to create temp dir");
        let app = AppContext::new(test_config(&mock.base_url(), &dir)).unwrap();
        Self { mock, app, dir }
    }

    pub fn catalog(&self) -> &Catalog {
        self.app.catalog()
    }

    pub fn query_client(&self) -> &QueryClient {
        self.app.query_client()
    }

    /// Runs a CLI command and returns its output.
    pub async fn run(&self, args: &[&str]) -> anyhow::Result<String> {
        use clap::Parser;

        let mut argv = vec!["orderme"];
        argv.extend_from_slice(args);
        let cli = orderme::cli::Cli::try_parse_from(argv)?;
        let mut out = Vec::new();
        orderme::cli::run(cli.command, &self.app, &mut out).await?;
        Ok(String::from_utf8(out)?)
    }
}

/// Standalone product API for cache tests that manage their own client.
pub fn product_api(mock: &MockCatalog) -> ProductApi {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(&mock.base_url(), &dir);
    ProductApi::new(RemoteClient::new(&config.api).unwrap())
}

/// Cache config with the given retry budget and a short backoff.
pub fn cache_config(max_retries: u32) -> CacheConfig {
    CacheConfig {
        max_retries,
        retry_backoff_base_ms: 10,
        ..CacheConfig::default()
    }
}

/// Three products across two categories.
pub fn seed(mock: &MockCatalog) -> Vec<MockProduct> {
    vec![
        mock.insert(MockProduct::new("Spring Rolls", 6.5, "APPETIZER")),
        mock.insert(MockProduct::new("Burger", 12.99, "MAIN_COURSE")),
        mock.insert(MockProduct::new("Cheesecake", 7.25, "DESSERT")),
    ]
}

/// Polls `condition` until it holds or `timeout` elapses.
pub async fn wait_until<F: Fn() -> bool>(timeout: Duration, condition: F) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
