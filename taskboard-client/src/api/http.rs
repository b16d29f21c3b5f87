/// HTTP implementation of [`BoardApi`] on top of `reqwest`
///
/// Non-success responses are decoded into the server's JSON error body. When
/// the body is not JSON (a proxy error page, for instance) the HTTP reason
/// phrase stands in for the message.

use super::board_api::BoardApi;
use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use taskboard_shared::error::ErrorBody;
use taskboard_shared::models::task::{
    AssignTaskInput, CreateTaskInput, MoveTaskInput, TaskDetails, UpdateTaskInput,
};
use taskboard_shared::models::user::{CreateUser, UpdateUser, User};
use taskboard_shared::service::Board;

/// Board API client for a running taskboard server
#[derive(Debug, Clone)]
pub struct HttpBoardApi {
    client: Client,
    base_url: String,
}

impl HttpBoardApi {
    /// Creates a client for `base_url` (e.g. `http://localhost:8080`)
    pub fn new(base_url: &str) -> ClientResult<Self> {
        Self::with_client(Client::new(), base_url)
    }

    /// Uses a preconfigured `reqwest` client
    pub fn with_client(client: Client, base_url: &str) -> ClientResult<Self> {
        let trimmed = base_url.trim_end_matches('/');
        let parsed =
            Url::parse(trimmed).map_err(|_| ClientError::InvalidUrl(base_url.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self {
            client,
            base_url: trimmed.to_string(),
        })
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = accept(request.send().await?).await?;
        Ok(response.json::<T>().await?)
    }

    async fn execute(&self, request: RequestBuilder) -> ClientResult<()> {
        accept(request.send().await?).await?;
        Ok(())
    }
}

async fn accept(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await?;
    let body = serde_json::from_str::<ErrorBody>(&text).unwrap_or_else(|_| {
        ErrorBody::message(status.canonical_reason().unwrap_or("Request failed"))
    });

    tracing::debug!(status = %status, error = %body.error, "Request rejected by server");
    Err(ClientError::Rejected(body))
}

#[async_trait]
impl BoardApi for HttpBoardApi {
    fn name(&self) -> &str {
        "http"
    }

    async fn board(&self) -> ClientResult<Board> {
        self.fetch(self.client.get(self.url("/board"))).await
    }

    async fn create_task(&self, input: CreateTaskInput) -> ClientResult<TaskDetails> {
        self.fetch(self.client.post(self.url("/tasks")).json(&input))
            .await
    }

    async fn update_task(&self, id: i32, input: UpdateTaskInput) -> ClientResult<TaskDetails> {
        self.fetch(self.client.put(self.url(&format!("/tasks/{}", id))).json(&input))
            .await
    }

    async fn move_task(&self, id: i32, input: MoveTaskInput) -> ClientResult<TaskDetails> {
        self.fetch(
            self.client
                .put(self.url(&format!("/tasks/{}/status", id)))
                .json(&input),
        )
        .await
    }

    async fn assign_task(&self, id: i32, input: AssignTaskInput) -> ClientResult<TaskDetails> {
        self.fetch(
            self.client
                .put(self.url(&format!("/tasks/{}/assignee", id)))
                .json(&input),
        )
        .await
    }

    async fn delete_task(&self, id: i32) -> ClientResult<()> {
        self.execute(self.client.delete(self.url(&format!("/tasks/{}", id))))
            .await
    }

    async fn user_tasks(&self, user_id: i32) -> ClientResult<Vec<TaskDetails>> {
        self.fetch(self.client.get(self.url(&format!("/users/{}/tasks", user_id))))
            .await
    }

    async fn create_user(&self, input: CreateUser) -> ClientResult<User> {
        self.fetch(self.client.post(self.url("/users")).json(&input))
            .await
    }

    async fn update_user(&self, id: i32, input: UpdateUser) -> ClientResult<User> {
        self.fetch(self.client.put(self.url(&format!("/users/{}", id))).json(&input))
            .await
    }

    async fn delete_user(&self, id: i32) -> ClientResult<()> {
        self.execute(self.client.delete(self.url(&format!("/users/{}", id))))
            .await
    }
}
