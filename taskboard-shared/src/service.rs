/// Board service: the server-side consistency rules
///
/// Handlers never talk to a [`BoardRepository`] directly. The service sits in
/// between and owns every rule that spans more than one row:
///
/// - a task's column is always derived from its status; client-supplied
///   column ids are never trusted
/// - a status change appends the task to the end of the target column
/// - a non-null assignee must be an existing user
/// - a user with assigned tasks cannot be deleted
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskboard_shared::models::task::CreateTaskInput;
/// use taskboard_shared::repository::InMemoryBoardRepository;
/// use taskboard_shared::seed::default_columns;
/// use taskboard_shared::service::BoardService;
/// use taskboard_shared::status::TaskStatus;
///
/// # #[tokio::main]
/// # async fn main() {
/// let repo = InMemoryBoardRepository::with_columns(default_columns());
/// let service = BoardService::new(Arc::new(repo));
///
/// let task = service
///     .create_task(CreateTaskInput {
///         title: "Write release notes".to_string(),
///         description: None,
///         status: TaskStatus::InProgress,
///         assignee_id: None,
///     })
///     .await
///     .unwrap();
///
/// assert_eq!(task.task.column_id, 2);
/// # }
/// ```

use crate::error::{BoardError, BoardResult};
use crate::models::column::{Column, CreateColumn};
use crate::models::task::{
    AssignTaskInput, CreateTaskInput, MoveTaskInput, NewTask, Placement, Task, TaskChanges,
    TaskDetails, UpdateTaskInput,
};
use crate::models::user::{CreateUser, UpdateUser, User};
use crate::repository::BoardRepository;
use crate::status::{resolve_column, TaskStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use validator::Validate;

/// Everything the board view needs in one response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub columns: Vec<Column>,
    pub tasks: Vec<TaskDetails>,
    pub users: Vec<User>,
}

/// Board operations on top of a repository
#[derive(Clone)]
pub struct BoardService {
    repo: Arc<dyn BoardRepository>,
}

impl BoardService {
    pub fn new(repo: Arc<dyn BoardRepository>) -> Self {
        Self { repo }
    }

    /// The underlying repository
    pub fn repository(&self) -> &Arc<dyn BoardRepository> {
        &self.repo
    }

    /// Backend reachability for health checks
    pub async fn ping(&self) -> BoardResult<()> {
        self.repo.ping().await
    }

    /// Columns, tasks with assignees, and users
    pub async fn board(&self) -> BoardResult<Board> {
        let columns = self.repo.list_columns().await?;
        let users = self.repo.list_users().await?;
        let tasks = self
            .repo
            .list_tasks()
            .await?
            .into_iter()
            .map(|task| TaskDetails::resolve(task, &users))
            .collect();

        Ok(Board {
            columns,
            tasks,
            users,
        })
    }

    // Columns

    pub async fn columns(&self) -> BoardResult<Vec<Column>> {
        self.repo.list_columns().await
    }

    pub async fn create_column(&self, input: CreateColumn) -> BoardResult<Column> {
        input.validate()?;
        let column = self.repo.create_column(input).await?;
        info!(column_id = column.id, name = %column.name, "Column created");
        Ok(column)
    }

    // Tasks

    pub async fn tasks(&self) -> BoardResult<Vec<TaskDetails>> {
        let users = self.repo.list_users().await?;
        Ok(self
            .repo
            .list_tasks()
            .await?
            .into_iter()
            .map(|task| TaskDetails::resolve(task, &users))
            .collect())
    }

    pub async fn task(&self, id: i32) -> BoardResult<TaskDetails> {
        let task = self.find_task(id).await?;
        self.with_assignee(task).await
    }

    /// Creates a task in the column matching its status
    ///
    /// # Errors
    ///
    /// - `Validation` for a bad title or an unknown assignee
    /// - `Configuration` when the status column is missing
    pub async fn create_task(&self, input: CreateTaskInput) -> BoardResult<TaskDetails> {
        input.validate()?;
        self.ensure_assignee_exists(input.assignee_id).await?;

        let placement = self.placement_for(input.status).await?;
        let task = self
            .repo
            .create_task(NewTask {
                title: input.title,
                description: input.description,
                status: placement.status,
                assignee_id: input.assignee_id,
                column_id: placement.column_id,
                order: None,
            })
            .await?;

        info!(
            task_id = task.id,
            status = %task.status,
            column_id = task.column_id,
            order = task.order,
            "Task created"
        );
        self.with_assignee(task).await
    }

    /// Dialog edit: replaces title, description and assignee, and moves the
    /// task when the status changed
    pub async fn update_task(&self, id: i32, input: UpdateTaskInput) -> BoardResult<TaskDetails> {
        input.validate()?;
        let current = self.find_task(id).await?;
        self.ensure_assignee_exists(input.assignee_id).await?;

        let placement = if input.status != current.status {
            Some(self.placement_for(input.status).await?)
        } else {
            None
        };

        let changes = TaskChanges {
            title: Some(input.title),
            description: Some(input.description),
            assignee_id: Some(input.assignee_id),
            placement,
        };
        let task = self.repo.update_task(id, changes, input.version).await?;

        info!(task_id = id, version = task.version, "Task updated");
        self.with_assignee(task).await
    }

    /// Drag and drop: changes status, recomputes the column, appends
    ///
    /// Moving to the current status writes nothing and returns the task
    /// unchanged.
    pub async fn move_task(&self, id: i32, input: MoveTaskInput) -> BoardResult<TaskDetails> {
        let current = self.find_task(id).await?;
        if current.status == input.status {
            debug!(task_id = id, status = %input.status, "Task already has this status");
            return self.with_assignee(current).await;
        }

        let placement = self.placement_for(input.status).await?;
        let task = self.repo.move_task(id, placement, input.version).await?;

        info!(
            task_id = id,
            from = %current.status,
            to = %task.status,
            column_id = task.column_id,
            order = task.order,
            "Task moved"
        );
        self.with_assignee(task).await
    }

    /// Sets or clears the assignee
    pub async fn assign_task(&self, id: i32, input: AssignTaskInput) -> BoardResult<TaskDetails> {
        self.find_task(id).await?;
        self.ensure_assignee_exists(input.assignee_id).await?;

        let changes = TaskChanges {
            assignee_id: Some(input.assignee_id),
            ..Default::default()
        };
        let task = self.repo.update_task(id, changes, input.version).await?;

        info!(task_id = id, assignee_id = ?task.assignee_id, "Task assignee changed");
        self.with_assignee(task).await
    }

    pub async fn delete_task(&self, id: i32) -> BoardResult<()> {
        self.repo.delete_task(id).await?;
        info!(task_id = id, "Task deleted");
        Ok(())
    }

    // Users

    /// All users, name descending
    pub async fn users(&self) -> BoardResult<Vec<User>> {
        self.repo.list_users().await
    }

    pub async fn user(&self, id: i32) -> BoardResult<User> {
        self.repo
            .find_user(id)
            .await?
            .ok_or_else(|| BoardError::user_not_found(id))
    }

    pub async fn create_user(&self, input: CreateUser) -> BoardResult<User> {
        input.validate()?;
        self.ensure_email_free(&input.email, None).await?;
        let user = self.repo.create_user(input).await?;
        info!(user_id = user.id, "User created");
        Ok(user)
    }

    pub async fn update_user(&self, id: i32, input: UpdateUser) -> BoardResult<User> {
        input.validate()?;
        self.user(id).await?;
        self.ensure_email_free(&input.email, Some(id)).await?;
        let user = self.repo.update_user(id, input).await?;
        info!(user_id = id, "User updated");
        Ok(user)
    }

    /// Deletes a user with no assigned tasks
    pub async fn delete_user(&self, id: i32) -> BoardResult<()> {
        match self.repo.delete_user(id).await {
            Ok(()) => {
                info!(user_id = id, "User deleted");
                Ok(())
            }
            Err(err @ BoardError::HasAssignedTasks { .. }) => {
                warn!(user_id = id, error = %err, "Refused to delete user");
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Tasks assigned to a user, ordered by status then title
    pub async fn user_tasks(&self, user_id: i32) -> BoardResult<Vec<TaskDetails>> {
        let user = self.user(user_id).await?;
        Ok(self
            .repo
            .tasks_for_assignee(user_id)
            .await?
            .into_iter()
            .map(|task| TaskDetails {
                task,
                assignee: Some(user.clone()),
            })
            .collect())
    }

    /// Assigned-task count for every user, zero included
    pub async fn user_task_counts(&self) -> BoardResult<BTreeMap<i32, i64>> {
        let mut counts: BTreeMap<i32, i64> = self
            .repo
            .list_users()
            .await?
            .into_iter()
            .map(|user| (user.id, 0))
            .collect();

        for (user_id, count) in self.repo.assigned_task_counts().await? {
            counts.insert(user_id, count);
        }
        Ok(counts)
    }

    pub async fn user_count(&self) -> BoardResult<i64> {
        self.repo.count_users().await
    }

    // Helpers

    async fn find_task(&self, id: i32) -> BoardResult<Task> {
        self.repo
            .find_task(id)
            .await?
            .ok_or_else(|| BoardError::task_not_found(id))
    }

    async fn placement_for(&self, status: TaskStatus) -> BoardResult<Placement> {
        let columns = self.repo.list_columns().await?;
        let column = resolve_column(status, &columns)?;
        Ok(Placement {
            status,
            column_id: column.id,
        })
    }

    async fn ensure_assignee_exists(&self, assignee_id: Option<i32>) -> BoardResult<()> {
        if let Some(user_id) = assignee_id {
            if self.repo.find_user(user_id).await?.is_none() {
                return Err(BoardError::unknown_assignee());
            }
        }
        Ok(())
    }

    /// Rejects an email held by another user
    ///
    /// The unique index still rejects a concurrent insert of the same email.
    async fn ensure_email_free(&self, email: &str, owner: Option<i32>) -> BoardResult<()> {
        match self.repo.find_user_by_email(email).await? {
            Some(existing) if Some(existing.id) != owner => Err(BoardError::DuplicateEmail),
            _ => Ok(()),
        }
    }

    async fn with_assignee(&self, task: Task) -> BoardResult<TaskDetails> {
        let assignee = match task.assignee_id {
            Some(user_id) => self.repo.find_user(user_id).await?,
            None => None,
        };
        Ok(TaskDetails { task, assignee })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryBoardRepository;
    use crate::seed::default_columns;

    fn service() -> BoardService {
        BoardService::new(Arc::new(InMemoryBoardRepository::with_columns(
            default_columns(),
        )))
    }

    fn create_input(title: &str, status: TaskStatus) -> CreateTaskInput {
        CreateTaskInput {
            title: title.to_string(),
            description: None,
            status,
            assignee_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_task_resolves_column_and_appends() {
        let service = service();
        let first = service.create_task(create_input("A", TaskStatus::Done)).await.unwrap();
        let second = service.create_task(create_input("B", TaskStatus::Done)).await.unwrap();

        assert_eq!(first.task.column_id, 3);
        assert_eq!(first.task.order, 0);
        assert_eq!(second.task.order, 1);
    }

    #[tokio::test]
    async fn test_create_task_with_unknown_assignee_fails() {
        let service = service();
        let mut input = create_input("A", TaskStatus::Todo);
        input.assignee_id = Some(42);

        let err = service.create_task(input).await.unwrap_err();
        match err {
            BoardError::Validation(fields) => assert!(fields.contains_key("assigneeId")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_done_column_is_configuration_error() {
        let columns = default_columns()
            .into_iter()
            .filter(|column| column.name != "Done")
            .collect();
        let service = BoardService::new(Arc::new(InMemoryBoardRepository::with_columns(columns)));

        let err = service
            .create_task(create_input("Ship it", TaskStatus::Done))
            .await
            .unwrap_err();
        assert!(matches!(err, BoardError::Configuration(_)));
        assert!(service.tasks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_move_to_same_status_writes_nothing() {
        let service = service();
        let created = service.create_task(create_input("A", TaskStatus::Todo)).await.unwrap();

        let moved = service
            .move_task(
                created.task.id,
                MoveTaskInput {
                    status: TaskStatus::Todo,
                    version: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(moved.task.version, created.task.version);
    }

    #[tokio::test]
    async fn test_update_task_status_change_moves_column() {
        let service = service();
        let created = service.create_task(create_input("A", TaskStatus::Todo)).await.unwrap();

        let updated = service
            .update_task(
                created.task.id,
                UpdateTaskInput {
                    title: "A (edited)".to_string(),
                    description: Some("details".to_string()),
                    status: TaskStatus::InProgress,
                    assignee_id: None,
                    version: Some(created.task.version),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.task.title, "A (edited)");
        assert_eq!(updated.task.column_id, 2);
        assert_eq!(updated.task.version, created.task.version + 1);
    }

    #[tokio::test]
    async fn test_user_task_counts_include_zero() {
        let service = service();
        let busy = service
            .create_user(CreateUser {
                name: "Jordan Lee".to_string(),
                email: "jordan.lee@example.com".to_string(),
                role: None,
                avatar: None,
            })
            .await
            .unwrap();
        let idle = service
            .create_user(CreateUser {
                name: "Quinn Murphy".to_string(),
                email: "quinn.murphy@example.com".to_string(),
                role: None,
                avatar: None,
            })
            .await
            .unwrap();

        let mut input = create_input("A", TaskStatus::Todo);
        input.assignee_id = Some(busy.id);
        service.create_task(input).await.unwrap();

        let counts = service.user_task_counts().await.unwrap();
        assert_eq!(counts[&busy.id], 1);
        assert_eq!(counts[&idle.id], 0);
    }

    fn user_input(name: &str, email: &str) -> CreateUser {
        CreateUser {
            name: name.to_string(),
            email: email.to_string(),
            role: None,
            avatar: None,
        }
    }

    #[tokio::test]
    async fn test_assign_missing_task_is_not_found_before_assignee_check() {
        let service = service();

        let err = service
            .assign_task(
                404,
                AssignTaskInput {
                    assignee_id: Some(77),
                    version: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err, BoardError::task_not_found(404));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected_before_write() {
        let service = service();
        let alex = service
            .create_user(user_input("Alex Johnson", "alex.johnson@example.com"))
            .await
            .unwrap();

        let err = service
            .create_user(user_input("Alex Again", "alex.johnson@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err, BoardError::DuplicateEmail);
        assert_eq!(service.users().await.unwrap().len(), 1);

        // Keeping your own email is not a conflict
        let renamed = service
            .update_user(
                alex.id,
                UpdateUser {
                    name: "Alex J.".to_string(),
                    email: "alex.johnson@example.com".to_string(),
                    role: None,
                    avatar: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "Alex J.");

        let sam = service
            .create_user(user_input("Sam Rivera", "sam.rivera@example.com"))
            .await
            .unwrap();
        let err = service
            .update_user(
                sam.id,
                UpdateUser {
                    name: "Sam Rivera".to_string(),
                    email: "alex.johnson@example.com".to_string(),
                    role: None,
                    avatar: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err, BoardError::DuplicateEmail);

        let err = service
            .update_user(
                999,
                UpdateUser {
                    name: "Ghost".to_string(),
                    email: "alex.johnson@example.com".to_string(),
                    role: None,
                    avatar: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err, BoardError::user_not_found(999));
    }
}
