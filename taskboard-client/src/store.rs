/// Optimistic task store
///
/// A [`TaskStore`] is an immutable snapshot of the board's tasks. Every
/// mutation returns a new store and leaves the receiver untouched, so the
/// session can keep the pre-mutation snapshot around and restore it when the
/// server rejects a change. Cloning a store is cheap (one `Arc` bump).
///
/// # Example
///
/// ```
/// use taskboard_client::store::TaskStore;
///
/// let empty = TaskStore::default();
/// let next = empty.without(5);
/// assert!(empty.is_empty() && next.is_empty());
/// ```

use std::collections::BTreeMap;
use std::sync::Arc;
use taskboard_shared::models::task::TaskDetails;
use taskboard_shared::models::user::User;
use taskboard_shared::status::TaskStatus;

/// Change pushed into the store from outside an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskUpdate {
    /// Canonical record from the server
    Upsert(TaskDetails),

    /// Task removed elsewhere
    Deleted { id: i32 },
}

/// Immutable snapshot of the session's tasks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskStore {
    tasks: Arc<Vec<TaskDetails>>,
}

impl TaskStore {
    pub fn new(tasks: Vec<TaskDetails>) -> Self {
        Self {
            tasks: Arc::new(tasks),
        }
    }

    /// Tasks in insertion order
    pub fn tasks(&self) -> &[TaskDetails] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: i32) -> Option<&TaskDetails> {
        self.tasks.iter().find(|details| details.task.id == id)
    }

    /// Tasks with `status`, by `order` ascending
    ///
    /// Equal orders keep their position in the store.
    pub fn grouped(&self, status: TaskStatus) -> Vec<&TaskDetails> {
        let mut tasks: Vec<&TaskDetails> = self
            .tasks
            .iter()
            .filter(|details| details.task.status == status)
            .collect();
        tasks.sort_by_key(|details| details.task.order);
        tasks
    }

    /// Every status with its ordered tasks, in board order
    pub fn board(&self) -> BTreeMap<TaskStatus, Vec<&TaskDetails>> {
        TaskStatus::ALL
            .into_iter()
            .map(|status| (status, self.grouped(status)))
            .collect()
    }

    /// Number of tasks in a column, not counting `excluding`
    pub fn count_in_column(&self, column_id: i32, excluding: i32) -> usize {
        self.tasks
            .iter()
            .filter(|details| details.task.column_id == column_id && details.task.id != excluding)
            .count()
    }

    /// Replaces the task with the same id, or appends it
    pub fn with_upsert(&self, incoming: TaskDetails) -> Self {
        let mut tasks = self.tasks.as_ref().clone();
        match tasks
            .iter_mut()
            .find(|details| details.task.id == incoming.task.id)
        {
            Some(existing) => *existing = incoming,
            None => tasks.push(incoming),
        }
        Self::new(tasks)
    }

    /// Drops a task; unknown ids leave the contents unchanged
    pub fn without(&self, id: i32) -> Self {
        let tasks = self
            .tasks
            .iter()
            .filter(|details| details.task.id != id)
            .cloned()
            .collect();
        Self::new(tasks)
    }

    pub fn apply(&self, update: TaskUpdate) -> Self {
        match update {
            TaskUpdate::Upsert(details) => self.with_upsert(details),
            TaskUpdate::Deleted { id } => self.without(id),
        }
    }

    /// Moves a task to a column, appending it after the column's other tasks
    ///
    /// Returns `None` when the task is not in the store.
    pub fn with_placement(&self, id: i32, status: TaskStatus, column_id: i32) -> Option<Self> {
        let order = i32::try_from(self.count_in_column(column_id, id)).unwrap_or(i32::MAX);
        self.with_task(id, |details| {
            details.task.status = status;
            details.task.column_id = column_id;
            details.task.order = order;
        })
    }

    /// Sets the assignee id and its denormalized profile together
    pub fn with_assignee(&self, id: i32, assignee: Option<&User>, assignee_id: Option<i32>) -> Option<Self> {
        self.with_task(id, |details| {
            details.task.assignee_id = assignee_id;
            details.assignee = assignee.cloned();
        })
    }

    /// Refreshes the denormalized profile on every task assigned to `user`
    pub fn with_assignee_profile(&self, user: &User) -> Self {
        let tasks = self
            .tasks
            .iter()
            .cloned()
            .map(|mut details| {
                if details.task.assignee_id == Some(user.id) {
                    details.assignee = Some(user.clone());
                }
                details
            })
            .collect();
        Self::new(tasks)
    }

    /// Applies `edit` to a copy of one task
    pub fn with_task(&self, id: i32, edit: impl FnOnce(&mut TaskDetails)) -> Option<Self> {
        let index = self.tasks.iter().position(|details| details.task.id == id)?;
        let mut tasks = self.tasks.as_ref().clone();
        edit(&mut tasks[index]);
        Some(Self::new(tasks))
    }
}
