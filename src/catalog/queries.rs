//! Query and mutation factories for the catalog.

use std::sync::Arc;
use std::time::Duration;

use crate::catalog::api::ProductApi;
use crate::catalog::keys;
use crate::catalog::model::{Product, ProductCategory, ProductList, ProductPayload, UpdateProduct};
use crate::config::CacheConfig;
use crate::mutation::Mutation;
use crate::query::{QueryClient, QueryOptions, QueryStatus, QuerySubscription};
use crate::remote::RemoteError;

pub type CreateProduct = Mutation<ProductPayload, Product>;
pub type EditProduct = Mutation<UpdateProduct, Product>;
pub type DeleteProduct = Mutation<String, ()>;

/// Binds the product endpoints to the shared query cache.
#[derive(Clone)]
pub struct Catalog {
    client: QueryClient,
    api: ProductApi,
    options: QueryOptions,
    featured_stale_time: Duration,
}

impl Catalog {
    pub fn new(client: QueryClient, api: ProductApi, config: &CacheConfig) -> Self {
        Self {
            client,
            api,
            options: QueryOptions::from_config(config),
            featured_stale_time: config.featured_stale_time(),
        }
    }

    pub fn query_client(&self) -> &QueryClient {
        &self.client
    }

    pub fn api(&self) -> &ProductApi {
        &self.api
    }

    /// All products, `["products"]`.
    pub fn products(&self) -> QuerySubscription<ProductList> {
        let api = self.api.clone();
        self.client.subscribe(
            keys::products(),
            move || {
                let api = api.clone();
                async move { api.list().await }
            },
            self.options,
        )
    }

    /// Featured products, `["products", "featured"]`.
    pub fn featured(&self) -> QuerySubscription<ProductList> {
        let api = self.api.clone();
        self.client.subscribe(
            keys::featured(),
            move || {
                let api = api.clone();
                async move { api.featured().await }
            },
            self.options.with_stale_time(self.featured_stale_time),
        )
    }

    pub fn by_category(&self, category: ProductCategory) -> QuerySubscription<ProductList> {
        let api = self.api.clone();
        self.client.subscribe(
            keys::category(category),
            move || {
                let api = api.clone();
                async move { api.by_category(category).await }
            },
            self.options,
        )
    }

    pub fn product(&self, id: &str) -> QuerySubscription<Product> {
        let api = self.api.clone();
        let id = id.to_string();
        self.client.subscribe(
            keys::product(&id),
            move || {
                let api = api.clone();
                let id = id.clone();
                async move { api.get(&id).await }
            },
            self.options,
        )
    }

    pub fn create_product(&self) -> CreateProduct {
        let api = self.api.clone();
        Mutation::new("create_product", self.client.clone(), move |payload: ProductPayload| {
            let api = api.clone();
            async move { api.create(&payload).await }
        })
        .invalidates([keys::products()])
    }

    pub fn update_product(&self) -> EditProduct {
        let api = self.api.clone();
        Mutation::new("update_product", self.client.clone(), move |update: UpdateProduct| {
            let api = api.clone();
            async move { api.update(&update.id, &update.payload).await }
        })
        .invalidates([keys::products()])
    }

    pub fn delete_product(&self) -> DeleteProduct {
        let api = self.api.clone();
        Mutation::new("delete_product", self.client.clone(), move |id: String| {
            let api = api.clone();
            async move { api.delete(&id).await }
        })
        .invalidates([keys::products()])
    }
}

/// Waits for the subscription to settle. An error wins over stale data.
pub async fn load<T: Send + Sync + 'static>(
    subscription: &mut QuerySubscription<T>,
) -> Result<Arc<T>, RemoteError> {
    let snapshot = subscription.settled().await;
    if snapshot.status == QueryStatus::Error {
        if let Some(error) = snapshot.error {
            return Err(error);
        }
    }
    snapshot.data.ok_or_else(|| {
        RemoteError::network(format!("Query {} returned no data", subscription.key()))
    })
}
