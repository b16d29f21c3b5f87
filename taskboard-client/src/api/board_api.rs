/// Board API trait
///
/// The session talks to the server only through this trait, one call per
/// user action. Implementations return the server's canonical records so the
/// session can replace its optimistic copies with them.

use crate::error::ClientResult;
use async_trait::async_trait;
use taskboard_shared::models::task::{
    AssignTaskInput, CreateTaskInput, MoveTaskInput, TaskDetails, UpdateTaskInput,
};
use taskboard_shared::models::user::{CreateUser, UpdateUser, User};
use taskboard_shared::service::Board;

/// Remote board operations
#[async_trait]
pub trait BoardApi: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    /// Columns, tasks (with assignees) and users in one snapshot
    async fn board(&self) -> ClientResult<Board>;

    async fn create_task(&self, input: CreateTaskInput) -> ClientResult<TaskDetails>;

    /// Dialog update (title, description, status, assignee)
    async fn update_task(&self, id: i32, input: UpdateTaskInput) -> ClientResult<TaskDetails>;

    /// Status change; the server recomputes column and order
    async fn move_task(&self, id: i32, input: MoveTaskInput) -> ClientResult<TaskDetails>;

    async fn assign_task(&self, id: i32, input: AssignTaskInput) -> ClientResult<TaskDetails>;

    async fn delete_task(&self, id: i32) -> ClientResult<()>;

    /// Tasks currently assigned to a user
    async fn user_tasks(&self, user_id: i32) -> ClientResult<Vec<TaskDetails>>;

    async fn create_user(&self, input: CreateUser) -> ClientResult<User>;

    async fn update_user(&self, id: i32, input: UpdateUser) -> ClientResult<User>;

    /// Refused by the server while tasks reference the user
    async fn delete_user(&self, id: i32) -> ClientResult<()>;
}
