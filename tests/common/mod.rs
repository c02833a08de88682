//! Shared helpers for the HTTP integration tests.
//!
//! Each integration test file is compiled as its own crate, so helpers used by
//! only one of them would otherwise trigger dead code warnings.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use taskboard::api::{router, AppState};
use taskboard::store::{SharedTaskGateway, SqliteTaskStore, StoreError, TaskGateway};
use taskboard::task::{NewTask, Task, TaskFilter, TaskId, TaskPatch};
use taskboard::Config;

// =============================================================================
// Gateways
// =============================================================================

/// In-memory SQLite gateway that counts every call reaching storage.
pub struct CountingGateway {
    inner: SqliteTaskStore,
    calls: AtomicUsize,
    mutations: AtomicUsize,
}

impl CountingGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: SqliteTaskStore::open_in_memory().expect("in-memory database"),
            calls: AtomicUsize::new(0),
            mutations: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    fn record(&self, mutation: bool) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if mutation {
            self.mutations.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl TaskGateway for CountingGateway {
    async fn create(&self, task: NewTask) -> Result<Task, StoreError> {
        self.record(true);
        self.inner.create(task).await
    }

    async fn find_by_id(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
        self.record(false);
        self.inner.find_by_id(id).await
    }

    async fn list(&self, filter: TaskFilter) -> Result<Vec<Task>, StoreError> {
        self.record(false);
        self.inner.list(filter).await
    }

    async fn update(&self, id: TaskId, patch: TaskPatch) -> Result<Task, StoreError> {
        self.record(true);
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: TaskId) -> Result<(), StoreError> {
        self.record(true);
        self.inner.delete(id).await
    }
}

/// Gateway whose every call fails like an unreachable database.
pub struct FailingGateway;

fn unavailable() -> StoreError {
    StoreError::Worker("database is unavailable".to_string())
}

#[async_trait]
impl TaskGateway for FailingGateway {
    async fn create(&self, _task: NewTask) -> Result<Task, StoreError> {
        Err(unavailable())
    }

    async fn find_by_id(&self, _id: TaskId) -> Result<Option<Task>, StoreError> {
        Err(unavailable())
    }

    async fn list(&self, _filter: TaskFilter) -> Result<Vec<Task>, StoreError> {
        Err(unavailable())
    }

    async fn update(&self, _id: TaskId, _patch: TaskPatch) -> Result<Task, StoreError> {
        Err(unavailable())
    }

    async fn delete(&self, _id: TaskId) -> Result<(), StoreError> {
        Err(unavailable())
    }
}

// =============================================================================
// Apps
// =============================================================================

pub struct TestApp {
    pub router: Router,
    pub gateway: Arc<CountingGateway>,
}

pub fn app_with(config: Config, gateway: SharedTaskGateway) -> Router {
    router(Arc::new(AppState::new(config, gateway)))
}

pub fn test_app() -> TestApp {
    test_app_with_config(Config::default())
}

pub fn test_app_with_config(config: Config) -> TestApp {
    let gateway = CountingGateway::new();
    let router = app_with(config, gateway.clone());
    TestApp { router, gateway }
}

pub fn failing_app() -> Router {
    app_with(Config::default(), Arc::new(FailingGateway))
}

// =============================================================================
// Requests
// =============================================================================

pub fn form_request(method: Method, uri: &str, pairs: &[(&str, &str)]) -> Request<Body> {
    let body = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

pub fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn raw_request(method: Method, uri: &str, content_type: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Send a request and return status, headers and body text.
pub async fn send_raw(router: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, String) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}

/// Send a request and parse the JSON envelope.
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, _, body) = send_raw(router, request).await;
    let json = serde_json::from_str(&body)
        .unwrap_or_else(|e| panic!("response is not JSON ({e}): {body}"));
    (status, json)
}

/// Create a task through the API and return its JSON.
pub async fn create_task(router: &Router, title: &str, priority: &str) -> Value {
    let (status, body) = send(
        router,
        form_request(
            Method::POST,
            "/api/tasks/create",
            &[
                ("title", title),
                ("description", "описание"),
                ("priority", priority),
                ("dueDate", "2023-12-15"),
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
    body["task"].clone()
}
