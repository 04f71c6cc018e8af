//! Product endpoints of the catalog API.

use std::sync::Arc;

use crate::catalog::model::{Product, ProductCategory, ProductList, ProductPayload};
use crate::remote::{RemoteClient, RemoteError};

#[derive(Debug, Clone)]
pub struct ProductApi {
    client: RemoteClient,
}

impl ProductApi {
    pub fn new(client: RemoteClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RemoteClient {
        &self.client
    }

    /// `GET /products`
    pub async fn list(&self) -> Result<ProductList, RemoteError> {
        self.fetch_list("products").await
    }

    /// `GET /products/featured`
    pub async fn featured(&self) -> Result<ProductList, RemoteError> {
        self.fetch_list("products/featured").await
    }

    /// `GET /products/category/{category}`
    pub async fn by_category(&self, category: ProductCategory) -> Result<ProductList, RemoteError> {
        self.fetch_list(&format!("products/category/{}", category.as_str()))
            .await
    }

    /// `GET /products/{id}`
    pub async fn get(&self, id: &str) -> Result<Product, RemoteError> {
        self.client.get(&product_path(id)).await
    }

    /// `POST /products`
    pub async fn create(&self, payload: &ProductPayload) -> Result<Product, RemoteError> {
        self.client.post("products", payload).await
    }

    /// `PUT /products/{id}`
    pub async fn update(&self, id: &str, payload: &ProductPayload) -> Result<Product, RemoteError> {
        self.client.put(&product_path(id), payload).await
    }

    /// `DELETE /products/{id}`
    pub async fn delete(&self, id: &str) -> Result<(), RemoteError> {
        self.client.delete(&product_path(id)).await
    }

    async fn fetch_list(&self, path: &str) -> Result<ProductList, RemoteError> {
        let products: Vec<Product> = self.client.get(path).await?;
        Ok(products.into_iter().map(Arc::new).collect())
    }
}

/// `products/{id}` with the id percent-encoded as a single path segment.
fn product_path(id: &str) -> String {
    let mut path = String::from("products/");
    for byte in id.trim().bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            path.push(char::from(byte));
        } else {
            path.push_str(&format!("%{:02X}", byte));
        }
    }
    path
}
