/// In-process mock of the board API
///
/// Runs the real board rules ([`BoardService`]) over the in-memory
/// repository, so responses match what the server would send. Failures can
/// be injected to exercise rollback paths, and every request is counted so
/// tests can assert that local guards never reached the network.

use super::board_api::BoardApi;
use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use taskboard_shared::error::ErrorBody;
use taskboard_shared::models::column::Column;
use taskboard_shared::models::task::{
    AssignTaskInput, CreateTaskInput, MoveTaskInput, TaskDetails, UpdateTaskInput,
};
use taskboard_shared::models::user::{CreateUser, UpdateUser, User};
use taskboard_shared::repository::InMemoryBoardRepository;
use taskboard_shared::seed::default_columns;
use taskboard_shared::service::{Board, BoardService};
use tokio::sync::Mutex;

/// Mock board API backed by an in-memory board
pub struct MockBoardApi {
    board: BoardService,
    requests: AtomicUsize,
    queued_failures: Mutex<VecDeque<ErrorBody>>,
    persistent_failure: Mutex<Option<ErrorBody>>,
}

impl MockBoardApi {
    /// Board with the three status columns
    pub fn new() -> Self {
        Self::with_columns(default_columns())
    }

    /// Board with a custom column set
    pub fn with_columns(columns: Vec<Column>) -> Self {
        let repo = InMemoryBoardRepository::with_columns(columns);
        Self {
            board: BoardService::new(Arc::new(repo)),
            requests: AtomicUsize::new(0),
            queued_failures: Mutex::new(VecDeque::new()),
            persistent_failure: Mutex::new(None),
        }
    }

    /// Direct access to the backing board, bypassing the request counter
    pub fn service(&self) -> &BoardService {
        &self.board
    }

    /// Number of requests received so far
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Rejects the next request with `body`
    pub async fn fail_next(&self, body: ErrorBody) {
        self.queued_failures.lock().await.push_back(body);
    }

    /// Rejects every request with `body` until [`MockBoardApi::recover`]
    pub async fn fail_always(&self, body: ErrorBody) {
        *self.persistent_failure.lock().await = Some(body);
    }

    /// Clears injected failures
    pub async fn recover(&self) {
        self.queued_failures.lock().await.clear();
        *self.persistent_failure.lock().await = None;
    }

    async fn begin(&self, operation: &'static str) -> ClientResult<()> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        if let Some(body) = self.queued_failures.lock().await.pop_front() {
            tracing::debug!(operation, error = %body.error, "Mock API injecting failure");
            return Err(ClientError::Rejected(body));
        }
        if let Some(body) = self.persistent_failure.lock().await.clone() {
            tracing::debug!(operation, error = %body.error, "Mock API injecting failure");
            return Err(ClientError::Rejected(body));
        }
        Ok(())
    }
}

impl Default for MockBoardApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BoardApi for MockBoardApi {
    fn name(&self) -> &str {
        "mock"
    }

    async fn board(&self) -> ClientResult<Board> {
        self.begin("board").await?;
        Ok(self.board.board().await?)
    }

    async fn create_task(&self, input: CreateTaskInput) -> ClientResult<TaskDetails> {
        self.begin("create_task").await?;
        Ok(self.board.create_task(input).await?)
    }

    async fn update_task(&self, id: i32, input: UpdateTaskInput) -> ClientResult<TaskDetails> {
        self.begin("update_task").await?;
        Ok(self.board.update_task(id, input).await?)
    }

    async fn move_task(&self, id: i32, input: MoveTaskInput) -> ClientResult<TaskDetails> {
        self.begin("move_task").await?;
        Ok(self.board.move_task(id, input).await?)
    }

    async fn assign_task(&self, id: i32, input: AssignTaskInput) -> ClientResult<TaskDetails> {
        self.begin("assign_task").await?;
        Ok(self.board.assign_task(id, input).await?)
    }

    async fn delete_task(&self, id: i32) -> ClientResult<()> {
        self.begin("delete_task").await?;
        Ok(self.board.delete_task(id).await?)
    }

    async fn user_tasks(&self, user_id: i32) -> ClientResult<Vec<TaskDetails>> {
        self.begin("user_tasks").await?;
        Ok(self.board.user_tasks(user_id).await?)
    }

    async fn create_user(&self, input: CreateUser) -> ClientResult<User> {
        self.begin("create_user").await?;
        Ok(self.board.create_user(input).await?)
    }

    async fn update_user(&self, id: i32, input: UpdateUser) -> ClientResult<User> {
        self.begin("update_user").await?;
        Ok(self.board.update_user(id, input).await?)
    }

    async fn delete_user(&self, id: i32) -> ClientResult<()> {
        self.begin("delete_user").await?;
        Ok(self.board.delete_user(id).await?)
    }
}
