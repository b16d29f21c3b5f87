/// Task status values and the status ↔ column mapping
///
/// A task's `status` and its `column_id` must always agree. The only link
/// between the two is the column's display name:
///
/// ```text
/// todo        ↔ "To Do"
/// in-progress ↔ "In Progress"
/// done        ↔ "Done"
/// ```
///
/// The three columns are created at seed time and are a precondition of the
/// board. When one is missing, resolution fails with [`ConfigurationError`]
/// instead of silently dropping the write.
///
/// # Example
///
/// ```
/// use taskboard_shared::models::column::Column;
/// use taskboard_shared::status::{resolve_column, TaskStatus};
///
/// let columns = vec![
///     Column::new(1, "To Do", 1),
///     Column::new(2, "In Progress", 2),
///     Column::new(3, "Done", 3),
/// ];
///
/// let column = resolve_column(TaskStatus::InProgress, &columns).unwrap();
/// assert_eq!(column.id, 2);
/// ```

use crate::models::column::Column;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Semantic state of a task
///
/// The state machine is fully connected: any status can move to any other
/// status in one transition and there is no terminal state.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "task_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not started
    #[default]
    Todo,

    /// Being worked on
    InProgress,

    /// Finished
    Done,
}

impl TaskStatus {
    /// All statuses in board order
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    /// Wire representation (`todo`, `in-progress`, `done`)
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
        }
    }

    /// Display name of the column holding tasks with this status
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }

    /// Reverse mapping from a column name
    pub fn from_column_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.label() == name)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status literal
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown task status '{0}' (expected todo, in-progress or done)")]
pub struct ParseStatusError(pub String);

impl FromStr for TaskStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(TaskStatus::Todo),
            "in-progress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// The board is missing the column a status maps to
///
/// This is a deployment problem (unseeded or renamed columns), not a user
/// input problem, and is surfaced as a server error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("No column named \"{}\" exists for status '{status}'", .status.label())]
pub struct ConfigurationError {
    /// Status that could not be resolved
    pub status: TaskStatus,
}

/// Resolves the column a status belongs to
///
/// # Errors
///
/// Returns [`ConfigurationError`] when no column carries the status label.
pub fn resolve_column(status: TaskStatus, columns: &[Column]) -> Result<&Column, ConfigurationError> {
    columns
        .iter()
        .find(|column| column.name == status.label())
        .ok_or(ConfigurationError { status })
}

/// Validated status → column lookup
///
/// Built once from a column list; construction fails if any of the three
/// semantic columns is missing, so later lookups are infallible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    todo: Column,
    in_progress: Column,
    done: Column,
}

impl ColumnMap {
    /// Builds the map from the board's columns
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] for the first status without a column.
    pub fn from_columns(columns: &[Column]) -> Result<Self, ConfigurationError> {
        Ok(Self {
            todo: resolve_column(TaskStatus::Todo, columns)?.clone(),
            in_progress: resolve_column(TaskStatus::InProgress, columns)?.clone(),
            done: resolve_column(TaskStatus::Done, columns)?.clone(),
        })
    }

    /// Column for a status
    pub fn column_for(&self, status: TaskStatus) -> &Column {
        match status {
            TaskStatus::Todo => &self.todo,
            TaskStatus::InProgress => &self.in_progress,
            TaskStatus::Done => &self.done,
        }
    }

    /// Checks that a status/column pair satisfies the mapping
    pub fn is_consistent(&self, status: TaskStatus, column_id: i32) -> bool {
        self.column_for(status).id == column_id
    }
}
