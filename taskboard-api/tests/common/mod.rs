/// Common test utilities for integration tests
///
/// Every test gets its own in-memory board with the three status columns,
/// and drives the real router through `tower::Service::call`.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::Config;
use taskboard_shared::models::column::Column;
use taskboard_shared::repository::InMemoryBoardRepository;
use taskboard_shared::seed::default_columns;
use taskboard_shared::service::BoardService;
use tower::Service as _;

/// Test context containing the router and direct service access
pub struct TestContext {
    pub app: axum::Router,
    pub board: BoardService,
}

impl TestContext {
    /// Board with the standard three columns
    pub fn new() -> Self {
        Self::with_columns(default_columns())
    }

    /// Board with a custom column set
    pub fn with_columns(columns: Vec<Column>) -> Self {
        let repo = InMemoryBoardRepository::with_columns(columns);
        let board = BoardService::new(Arc::new(repo));
        let app = build_router(AppState::new(board.clone(), Config::for_tests()));
        TestContext { app, board }
    }

    /// Sends a request and returns the status and parsed JSON body
    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send("GET", uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send("PUT", uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send("DELETE", uri, None).await
    }

    /// Creates a user and returns its id
    pub async fn create_user(&self, name: &str) -> i64 {
        let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
        let (status, body) = self
            .post("/users", serde_json::json!({ "name": name, "email": email }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create user failed: {body}");
        body["id"].as_i64().unwrap()
    }

    /// Creates a task and returns the response body
    pub async fn create_task(&self, title: &str, status: &str, assignee_id: Option<i64>) -> Value {
        let (code, body) = self
            .post(
                "/tasks",
                serde_json::json!({ "title": title, "status": status, "assigneeId": assignee_id }),
            )
            .await;
        assert_eq!(code, StatusCode::CREATED, "create task failed: {body}");
        body
    }
}
