/// Board session
///
/// Holds the local copy of the board and runs every user action through the
/// same cycle:
///
/// 1. Snapshot the task store
/// 2. Apply the change optimistically
/// 3. Send exactly one request
/// 4. On success, replace the optimistic record with the server's record
/// 5. On failure, restore the snapshot
///
/// Each action ends with one notification and returns an [`ActionResult`];
/// errors never escape an action.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskboard_client::api::HttpBoardApi;
/// use taskboard_client::notify::Notifier;
/// use taskboard_client::session::BoardSession;
/// use taskboard_shared::status::TaskStatus;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let api = Arc::new(HttpBoardApi::new("http://localhost:8080")?);
/// let (notifier, mut notifications) = Notifier::channel();
/// let mut session = BoardSession::new(api, notifier);
///
/// session.load().await;
/// let result = session.move_task(5, TaskStatus::InProgress).await;
/// if !result.success {
///     eprintln!("{:?}", result.error);
/// }
/// # Ok(())
/// # }
/// ```

use crate::api::BoardApi;
use crate::error::ClientError;
use crate::notify::{Notification, Notifier};
use crate::store::{TaskStore, TaskUpdate};
use serde::Serialize;
use std::sync::Arc;
use taskboard_shared::error::FieldErrors;
use taskboard_shared::guard::ensure_task_deletable;
use taskboard_shared::models::column::Column;
use taskboard_shared::models::task::{
    AssignTaskInput, CreateTaskInput, MoveTaskInput, TaskDetails, UpdateTaskInput,
};
use taskboard_shared::models::user::{CreateUser, UpdateUser, User};
use taskboard_shared::status::{resolve_column, TaskStatus};
use tracing::{debug, info, warn};

/// Outcome of a session action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<FieldErrors>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_assigned_tasks: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_count: Option<i64>,
}

impl ActionResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    /// Failure carrying whatever detail the server sent back
    pub fn failed(err: &ClientError, fallback: &str) -> Self {
        let body = err.body();
        Self {
            success: false,
            error: Some(err.user_message(fallback)),
            field_errors: body.and_then(|body| body.field_errors.clone()),
            has_assigned_tasks: body.and_then(|body| body.has_assigned_tasks),
            task_count: body.and_then(|body| body.task_count),
        }
    }
}

/// Client-side board state plus the API it reconciles against
pub struct BoardSession {
    api: Arc<dyn BoardApi>,
    store: TaskStore,
    columns: Vec<Column>,
    users: Vec<User>,
    notifier: Notifier,
}

impl BoardSession {
    /// Empty session; call [`BoardSession::load`] to fetch the board
    pub fn new(api: Arc<dyn BoardApi>, notifier: Notifier) -> Self {
        Self {
            api,
            store: TaskStore::default(),
            columns: Vec::new(),
            users: Vec::new(),
            notifier,
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Team roster, as the server orders it
    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn task(&self, id: i32) -> Option<&TaskDetails> {
        self.store.get(id)
    }

    /// Replaces local state with the server's board
    pub async fn load(&mut self) -> ActionResult {
        match self.api.board().await {
            Ok(board) => {
                debug!(
                    backend = self.api.name(),
                    columns = board.columns.len(),
                    tasks = board.tasks.len(),
                    users = board.users.len(),
                    "Board loaded"
                );
                self.columns = board.columns;
                self.users = board.users;
                self.store = TaskStore::new(board.tasks);
                ActionResult::ok()
            }
            Err(err) => self.fail(err, "Failed to load board"),
        }
    }

    /// Changes a task's status (drag and drop)
    ///
    /// Moving a task onto its current status does nothing and sends nothing.
    pub async fn move_task(&mut self, task_id: i32, status: TaskStatus) -> ActionResult {
        const FALLBACK: &str = "Failed to move task";

        let (current, version) = match self.store.get(task_id) {
            Some(details) => (details.task.status, details.task.version),
            None => return self.fail(ClientError::UnknownTask(task_id), FALLBACK),
        };
        if current == status {
            return ActionResult::ok();
        }

        let column_id = match resolve_column(status, &self.columns) {
            Ok(column) => column.id,
            Err(err) => return self.fail(err.into(), FALLBACK),
        };

        let snapshot = self.store.clone();
        if let Some(next) = self.store.with_placement(task_id, status, column_id) {
            self.store = next;
        }

        let input = MoveTaskInput {
            status,
            version: Some(version),
        };
        match self.api.move_task(task_id, input).await {
            Ok(details) => {
                info!(task_id, status = %status, "Task moved");
                self.store = self.store.with_upsert(details);
                self.succeed("Task moved", format!("Task moved to {}", status.label()))
            }
            Err(err) => {
                self.store = snapshot;
                self.fail(err, FALLBACK)
            }
        }
    }

    /// Assigns a task to a team member, or unassigns it with `None`
    pub async fn set_assignee(&mut self, task_id: i32, user_id: Option<i32>) -> ActionResult {
        const FALLBACK: &str = "Failed to assign task";

        let version = match self.store.get(task_id) {
            Some(details) => details.task.version,
            None => return self.fail(ClientError::UnknownTask(task_id), FALLBACK),
        };

        let snapshot = self.store.clone();
        let member = user_id.and_then(|id| self.users.iter().find(|user| user.id == id));
        if let Some(next) = self.store.with_assignee(task_id, member, user_id) {
            self.store = next;
        }

        let input = AssignTaskInput {
            assignee_id: user_id,
            version: Some(version),
        };
        match self.api.assign_task(task_id, input).await {
            Ok(details) => {
                info!(task_id, assignee_id = ?user_id, "Task assignment changed");
                let description = match details.assignee.as_ref().or(member_of(&self.users, user_id)) {
                    Some(user) => format!("Task assigned to {}", user.name),
                    None => "Task unassigned".to_string(),
                };
                self.store = self.store.with_upsert(details);
                self.succeed("Task assigned", description)
            }
            Err(err) => {
                self.store = snapshot;
                self.fail(err, FALLBACK)
            }
        }
    }

    /// Creates a task from the task dialog
    pub async fn create_task(&mut self, input: CreateTaskInput) -> ActionResult {
        match self.api.create_task(input).await {
            Ok(details) => {
                info!(task_id = details.task.id, "Task created");
                self.store = self.store.with_upsert(details);
                self.succeed("Task created", "Your task has been created successfully.")
            }
            Err(err) => self.fail(err, "Failed to create task"),
        }
    }

    /// Saves the task dialog
    ///
    /// When `input.version` is empty the version last seen locally is sent.
    pub async fn update_task(&mut self, task_id: i32, mut input: UpdateTaskInput) -> ActionResult {
        const FALLBACK: &str = "Failed to update task";

        let (current_status, version) = match self.store.get(task_id) {
            Some(details) => (details.task.status, details.task.version),
            None => return self.fail(ClientError::UnknownTask(task_id), FALLBACK),
        };

        let column_id = if input.status == current_status {
            None
        } else {
            match resolve_column(input.status, &self.columns) {
                Ok(column) => Some(column.id),
                Err(err) => return self.fail(err.into(), FALLBACK),
            }
        };

        let snapshot = self.store.clone();
        let member = member_of(&self.users, input.assignee_id);
        let status = input.status;
        let optimistic = self
            .store
            .with_task(task_id, |details| {
                details.task.title = input.title.clone();
                details.task.description = input.description.clone();
                details.task.assignee_id = input.assignee_id;
                details.assignee = member.cloned();
            })
            .and_then(|edited| match column_id {
                Some(column_id) => edited.with_placement(task_id, status, column_id),
                None => Some(edited),
            });
        if let Some(next) = optimistic {
            self.store = next;
        }

        input.version = input.version.or(Some(version));
        match self.api.update_task(task_id, input).await {
            Ok(details) => {
                info!(task_id, "Task updated");
                self.store = self.store.with_upsert(details);
                self.succeed("Task updated", "Your task has been updated successfully.")
            }
            Err(err) => {
                self.store = snapshot;
                self.fail(err, FALLBACK)
            }
        }
    }

    /// Deletes a task
    ///
    /// Assigned tasks are refused locally without contacting the server.
    pub async fn delete_task(&mut self, task_id: i32) -> ActionResult {
        const FALLBACK: &str = "Failed to delete task";

        let guarded = match self.store.get(task_id) {
            Some(details) => ensure_task_deletable(&details.task),
            None => return self.fail(ClientError::UnknownTask(task_id), FALLBACK),
        };
        if let Err(blocked) = guarded {
            debug!(task_id, assignee_id = blocked.assignee_id, "Delete blocked locally");
            return self.fail(blocked.into(), FALLBACK);
        }

        let snapshot = self.store.clone();
        self.store = self.store.without(task_id);

        match self.api.delete_task(task_id).await {
            Ok(()) => {
                info!(task_id, "Task deleted");
                self.succeed("Task deleted", "Your task has been deleted successfully.")
            }
            Err(err) => {
                self.store = snapshot;
                self.fail(err, FALLBACK)
            }
        }
    }

    /// Tasks assigned to a user, checked before offering a delete
    pub async fn user_tasks(&self, user_id: i32) -> Option<Vec<TaskDetails>> {
        match self.api.user_tasks(user_id).await {
            Ok(tasks) => Some(tasks),
            Err(err) => {
                self.fail(err, "There was an error checking user tasks.");
                None
            }
        }
    }

    pub async fn create_user(&mut self, input: CreateUser) -> ActionResult {
        match self.api.create_user(input).await {
            Ok(user) => {
                info!(user_id = user.id, "User created");
                self.users.push(user);
                sort_roster(&mut self.users);
                self.succeed("User created", "User has been created successfully.")
            }
            Err(err) => self.fail(err, "There was an error processing your request."),
        }
    }

    /// Updates a user and refreshes the assignee shown on their tasks
    pub async fn update_user(&mut self, user_id: i32, input: UpdateUser) -> ActionResult {
        match self.api.update_user(user_id, input).await {
            Ok(user) => {
                info!(user_id, "User updated");
                self.store = self.store.with_assignee_profile(&user);
                match self.users.iter_mut().find(|member| member.id == user.id) {
                    Some(existing) => *existing = user,
                    None => self.users.push(user),
                }
                sort_roster(&mut self.users);
                self.succeed("User updated", "User has been updated successfully.")
            }
            Err(err) => self.fail(err, "There was an error processing your request."),
        }
    }

    /// Deletes a user; the server refuses while tasks are assigned to them
    pub async fn delete_user(&mut self, user_id: i32) -> ActionResult {
        match self.api.delete_user(user_id).await {
            Ok(()) => {
                info!(user_id, "User deleted");
                self.users.retain(|user| user.id != user_id);
                self.succeed("User deleted", "User has been deleted successfully.")
            }
            Err(err) => self.fail(err, "Failed to delete user."),
        }
    }

    /// Merges a record received outside an action
    pub fn upsert_from_server(&mut self, details: TaskDetails) {
        self.store = self.store.with_upsert(details);
    }

    /// Drops a task deleted elsewhere
    pub fn remove_locally(&mut self, task_id: i32) {
        self.store = self.store.without(task_id);
    }

    pub fn apply_update(&mut self, update: TaskUpdate) {
        self.store = self.store.apply(update);
    }

    fn succeed(&self, title: &str, description: impl Into<String>) -> ActionResult {
        self.notifier.notify(Notification::success(title, description));
        ActionResult::ok()
    }

    fn fail(&self, err: ClientError, fallback: &str) -> ActionResult {
        warn!(error = %err, "Board action failed");
        let result = ActionResult::failed(&err, fallback);
        self.notifier
            .notify(Notification::error(err.user_message(fallback)));
        result
    }
}

fn member_of(users: &[User], user_id: Option<i32>) -> Option<&User> {
    user_id.and_then(|id| users.iter().find(|user| user.id == id))
}

// Matches the server's user listing: name descending, then id.
fn sort_roster(users: &mut [User]) {
    users.sort_by(|a, b| b.name.cmp(&a.name).then(a.id.cmp(&b.id)));
}
