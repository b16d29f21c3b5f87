/// PostgreSQL board repository
///
/// Thin adapter from [`BoardRepository`] onto the model operations in
/// [`crate::models`]. Row-level errors are converted into [`BoardError`]
/// here, so a unique violation on `users.email` surfaces as
/// `DuplicateEmail` and a failed versioned update is told apart into
/// `NotFound` and `StaleWrite`.

use super::BoardRepository;
use crate::db::pool::health_check;
use crate::error::{BoardError, BoardResult};
use crate::models::column::{Column, CreateColumn};
use crate::models::task::{NewTask, Task, TaskChanges};
use crate::models::user::{CreateUser, UpdateUser, User, UserDeletion};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

/// Repository backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgBoardRepository {
    pool: PgPool,
}

impl PgBoardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl BoardRepository for PgBoardRepository {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> BoardResult<()> {
        health_check(&self.pool).await?;
        Ok(())
    }

    async fn list_columns(&self) -> BoardResult<Vec<Column>> {
        Ok(Column::list(&self.pool).await?)
    }

    async fn create_column(&self, data: CreateColumn) -> BoardResult<Column> {
        Ok(Column::create(&self.pool, data).await?)
    }

    async fn list_tasks(&self) -> BoardResult<Vec<Task>> {
        Ok(Task::list(&self.pool).await?)
    }

    async fn find_task(&self, id: i32) -> BoardResult<Option<Task>> {
        Ok(Task::find_by_id(&self.pool, id).await?)
    }

    async fn tasks_for_assignee(&self, user_id: i32) -> BoardResult<Vec<Task>> {
        Ok(Task::list_by_assignee(&self.pool, user_id).await?)
    }

    async fn count_tasks_in_column(&self, column_id: i32) -> BoardResult<i64> {
        Ok(Task::count_by_column(&self.pool, column_id).await?)
    }

    async fn assigned_task_counts(&self) -> BoardResult<Vec<(i32, i64)>> {
        Ok(Task::assigned_counts(&self.pool).await?)
    }

    async fn create_task(&self, data: NewTask) -> BoardResult<Task> {
        Ok(Task::create(&self.pool, data).await?)
    }

    async fn update_task(
        &self,
        id: i32,
        changes: TaskChanges,
        expected_version: Option<i32>,
    ) -> BoardResult<Task> {
        if let Some(task) = Task::update(&self.pool, id, changes, expected_version).await? {
            return Ok(task);
        }

        // Nothing matched: either the row is gone or its version moved on
        match (Task::find_by_id(&self.pool, id).await?, expected_version) {
            (Some(current), Some(expected)) => {
                debug!(task_id = id, expected, actual = current.version, "Rejected stale task write");
                Err(BoardError::StaleWrite {
                    id,
                    expected,
                    actual: current.version,
                })
            }
            _ => Err(BoardError::task_not_found(id)),
        }
    }

    async fn delete_task(&self, id: i32) -> BoardResult<()> {
        if Task::delete(&self.pool, id).await? {
            Ok(())
        } else {
            Err(BoardError::task_not_found(id))
        }
    }

    async fn list_users(&self) -> BoardResult<Vec<User>> {
        Ok(User::list(&self.pool).await?)
    }

    async fn find_user(&self, id: i32) -> BoardResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> BoardResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn create_user(&self, data: CreateUser) -> BoardResult<User> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn update_user(&self, id: i32, data: UpdateUser) -> BoardResult<User> {
        User::update(&self.pool, id, data)
            .await?
            .ok_or_else(|| BoardError::user_not_found(id))
    }

    async fn delete_user(&self, id: i32) -> BoardResult<()> {
        match User::delete_unassigned(&self.pool, id).await? {
            UserDeletion::Deleted => Ok(()),
            UserDeletion::NotFound => Err(BoardError::user_not_found(id)),
            UserDeletion::HasAssignedTasks(task_count) => {
                Err(BoardError::HasAssignedTasks { task_count })
            }
        }
    }

    async fn count_users(&self) -> BoardResult<i64> {
        Ok(User::count(&self.pool).await?)
    }
}
