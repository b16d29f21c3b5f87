/// Persistence contract for the board
///
/// The board is stored behind the [`BoardRepository`] trait so the server
/// can run on PostgreSQL in production and on an in-process store in tests
/// and demo mode. Both implementations honor the same contract:
///
/// - columns and tasks list by `order` ascending, ties by id
/// - users list by name descending, ties by id
/// - a task write with a stale `expected_version` fails with
///   [`BoardError::StaleWrite`] and changes nothing
/// - applying a [`Placement`] appends the task to its target column, with the
///   count and the write performed atomically
/// - a user referenced by any task cannot be deleted
///   ([`BoardError::HasAssignedTasks`])
/// - emails are unique ([`BoardError::DuplicateEmail`])
///
/// Consistency between `status` and `column_id` is the caller's job; see
/// [`crate::service::BoardService`].
///
/// # Implementations
///
/// - [`postgres::PgBoardRepository`]: sqlx on a `PgPool`
/// - [`memory::InMemoryBoardRepository`]: mutex-guarded vectors

use crate::error::BoardResult;
use crate::models::column::{Column, CreateColumn};
use crate::models::task::{NewTask, Placement, Task, TaskChanges};
use crate::models::user::{CreateUser, UpdateUser, User};
use async_trait::async_trait;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryBoardRepository;
pub use postgres::PgBoardRepository;

/// Board storage backend
#[async_trait]
pub trait BoardRepository: Send + Sync {
    /// Backend name for logs and health output
    fn name(&self) -> &'static str;

    /// Checks that the backend is reachable
    async fn ping(&self) -> BoardResult<()>;

    // Columns

    async fn list_columns(&self) -> BoardResult<Vec<Column>>;

    async fn create_column(&self, data: CreateColumn) -> BoardResult<Column>;

    // Tasks

    async fn list_tasks(&self) -> BoardResult<Vec<Task>>;

    async fn find_task(&self, id: i32) -> BoardResult<Option<Task>>;

    /// Tasks assigned to a user, ordered by status then title
    async fn tasks_for_assignee(&self, user_id: i32) -> BoardResult<Vec<Task>>;

    async fn count_tasks_in_column(&self, column_id: i32) -> BoardResult<i64>;

    /// `(user_id, task_count)` for every user with at least one task
    async fn assigned_task_counts(&self) -> BoardResult<Vec<(i32, i64)>>;

    /// Inserts a task; `order: None` appends it to its column
    async fn create_task(&self, data: NewTask) -> BoardResult<Task>;

    /// Applies a partial update
    ///
    /// Fails with `NotFound` when the task is absent and `StaleWrite` when
    /// `expected_version` is given and differs from the stored version.
    async fn update_task(
        &self,
        id: i32,
        changes: TaskChanges,
        expected_version: Option<i32>,
    ) -> BoardResult<Task>;

    /// Moves a task to a new status column, appending it there
    async fn move_task(
        &self,
        id: i32,
        placement: Placement,
        expected_version: Option<i32>,
    ) -> BoardResult<Task> {
        let changes = TaskChanges {
            placement: Some(placement),
            ..Default::default()
        };
        self.update_task(id, changes, expected_version).await
    }

    async fn delete_task(&self, id: i32) -> BoardResult<()>;

    // Users

    async fn list_users(&self) -> BoardResult<Vec<User>>;

    async fn find_user(&self, id: i32) -> BoardResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> BoardResult<Option<User>>;

    async fn create_user(&self, data: CreateUser) -> BoardResult<User>;

    async fn update_user(&self, id: i32, data: UpdateUser) -> BoardResult<User>;

    /// Deletes a user unless a task still references it
    async fn delete_user(&self, id: i32) -> BoardResult<()>;

    async fn count_users(&self) -> BoardResult<i64>;
}
