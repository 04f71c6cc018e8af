//! Mock catalog server for integration tests.

#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// A product as the mock server stores it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockProduct {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "available")]
    pub is_available: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

fn available() -> bool {
    true
}

impl MockProduct {
    pub fn new(name: &str, price: f64, category: &str) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
            description: format!("{} description", name),
            price,
            category: category.to_string(),
            image_url: None,
            is_available: true,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }
}

/// A captured request for assertions.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub body: Vec<u8>,
}

/// One-shot behaviour for the next request matching `method` and `path`.
#[derive(Debug, Clone)]
struct Script {
    method: Method,
    path: String,
    delay: Duration,
    failure: Option<(u16, String)>,
}

#[derive(Default)]
struct Inner {
    products: Vec<MockProduct>,
    next_id: i64,
    requests: Vec<CapturedRequest>,
    scripts: VecDeque<Script>,
    clock: u32,
}

#[derive(Clone, Default)]
struct MockState {
    inner: Arc<Mutex<Inner>>,
}

/// Stateful in-memory catalog served under `/api`.
pub struct MockCatalog {
    pub addr: SocketAddr,
    state: MockState,
    shutdown: tokio::sync::watch::Sender<bool>,
}

impl MockCatalog {
    pub async fn start() -> Self {
        let state = MockState::default();
        state.inner.lock().next_id = 1;

        let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);

        let app = Router::new()
            .route("/{*path}", any(handle_request))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock server");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.changed().await;
                })
                .await
                .ok();
        });

        Self {
            addr,
            state,
            shutdown: shutdown_tx,
        }
    }

    /// Base URL including the `/api` prefix.
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Stores a product directly, bypassing the HTTP surface.
    pub fn insert(&self, product: MockProduct) -> MockProduct {
        let mut inner = self.state.inner.lock();
        inner.store(product)
    }

    pub fn products(&self) -> Vec<MockProduct> {
        self.state.inner.lock().products.clone()
    }

    /// Delays the next matching request.
    pub fn delay_next(&self, method: Method, path: &str, delay: Duration) {
        self.script(method, path, delay, None);
    }

    /// Fails the next matching request with the given status and message.
    pub fn fail_next(&self, method: Method, path: &str, status: u16, message: &str) {
        self.script(method, path, Duration::ZERO, Some((status, message.to_string())));
    }

    fn script(&self, method: Method, path: &str, delay: Duration, failure: Option<(u16, String)>) {
        self.state.inner.lock().scripts.push_back(Script {
            method,
            path: path.to_string(),
            delay,
            failure,
        });
    }

    pub fn captured_requests(&self) -> Vec<CapturedRequest> {
        self.state.inner.lock().requests.clone()
    }

    /// Number of requests received for `method path`.
    pub fn request_count(&self, method: &str, path: &str) -> usize {
        self.state
            .inner
            .lock()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// Total number of requests received.
    pub fn total_requests(&self) -> usize {
        self.state.inner.lock().requests.len()
    }
}

impl Drop for MockCatalog {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

impl Inner {
    fn timestamp(&mut self) -> String {
        self.clock += 1;
        format!("2024-01-{:02}T10:00:00", (self.clock % 28) + 1)
    }

    fn store(&mut self, mut product: MockProduct) -> MockProduct {
        product.id = self.next_id;
        self.next_id += 1;
        let now = self.timestamp();
        product.created_at = now.clone();
        product.updated_at = now;
        self.products.push(product.clone());
        product
    }

    fn take_script(&mut self, method: &Method, path: &str) -> Option<Script> {
        let index = self
            .scripts
            .iter()
            .position(|s| &s.method == method && s.path == path)?;
        self.scripts.remove(index)
    }

    fn route(&mut self, method: &Method, path: &str, body: &[u8]) -> Response {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        match (method.clone(), segments.as_slice()) {
            (Method::GET, ["products"]) => Json(self.products.clone()).into_response(),
            (Method::GET, ["products", "featured"]) => {
                let mut featured: Vec<MockProduct> = self
                    .products
                    .iter()
                    .filter(|p| p.is_available)
                    .cloned()
                    .collect();
                featured.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                featured.truncate(6);
                Json(featured).into_response()
            }
            (Method::GET, ["products", "category", category]) => {
                let matching: Vec<MockProduct> = self
                    .products
                    .iter()
                    .filter(|p| p.is_available && p.category == *category)
                    .cloned()
                    .collect();
                Json(matching).into_response()
            }
            (Method::GET, ["products", id]) => match self.find(id) {
                Some(index) => Json(self.products[index].clone()).into_response(),
                None => not_found(path, id),
            },
            (Method::POST, ["products"]) => match serde_json::from_slice::<Value>(body) {
                Ok(value) => match product_from_body(value) {
                    Some(product) => (StatusCode::CREATED, Json(self.store(product))).into_response(),
                    None => error_response(400, "Invalid product payload", path),
                },
                Err(_) => error_response(400, "Malformed JSON", path),
            },
            (Method::PUT, ["products", id]) => {
                let Some(index) = self.find(id) else {
                    return not_found(path, id);
                };
                let Some(update) = serde_json::from_slice::<Value>(body).ok().and_then(product_from_body) else {
                    return error_response(400, "Invalid product payload", path);
                };
                let now = self.timestamp();
                let existing = &mut self.products[index];
                existing.name = update.name;
                existing.description = update.description;
                existing.price = update.price;
                existing.category = update.category;
                existing.image_url = update.image_url;
                existing.is_available = update.is_available;
                existing.updated_at = now;
                Json(existing.clone()).into_response()
            }
            (Method::DELETE, ["products", id]) => match self.find(id) {
                Some(index) => {
                    self.products.remove(index);
                    StatusCode::NO_CONTENT.into_response()
                }
                None => not_found(path, id),
            },
            _ => error_response(404, "No such endpoint", path),
        }
    }

    fn find(&self, id: &str) -> Option<usize> {
        let id: i64 = id.parse().ok()?;
        self.products.iter().position(|p| p.id == id)
    }
}

fn product_from_body(mut value: Value) -> Option<MockProduct> {
    let object = value.as_object_mut()?;
    object.insert("id".to_string(), json!(0));
    serde_json::from_value(value).ok()
}

fn not_found(path: &str, id: &str) -> Response {
    error_response(404, &format!("Product not found with id: {}", id), path)
}

fn error_response(status: u16, message: &str, path: &str) -> Response {
    let status = StatusCode::from_u16(status).unwrap();
    let body = json!({
        "message": message,
        "status": status.as_u16(),
        "timestamp": "2024-01-01T00:00:00",
        "path": format!("/api/{}", path.trim_start_matches('/')),
    });
    (status, Json(body)).into_response()
}

async fn handle_request(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let path = uri
        .path()
        .strip_prefix("/api")
        .unwrap_or(uri.path())
        .to_string();

    // Capture the request and compute the answer against current state.
    let (script, response) = {
        let mut inner = state.inner.lock();
        inner.requests.push(CapturedRequest {
            method: method.to_string(),
            path: path.clone(),
            body: body.to_vec(),
        });
        let script = inner.take_script(&method, &path);
        let failing = script.as_ref().is_some_and(|s| s.failure.is_some());
        let response = if failing {
            None
        } else {
            Some(inner.route(&method, &path, &body))
        };
        (script, response)
    };

    if let Some(script) = &script {
        if !script.delay.is_zero() {
            tokio::time::sleep(script.delay).await;
        }
    }

    match (script.and_then(|s| s.failure), response) {
        (Some((status, message)), _) => error_response(status, &message, &path),
        (None, Some(response)) => response,
        (None, None) => error_response(500, "Mock produced no response", &path),
    }
}
