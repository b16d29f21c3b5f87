/// Deletion guards
///
/// Two rules keep assignments from dangling:
///
/// - a user referenced by any task cannot be deleted (enforced by the
///   repository, authoritative)
/// - an assigned task cannot be deleted from the board UI (enforced by the
///   client before any request is made)

use crate::error::BoardError;
use crate::models::task::Task;

/// Fails with [`BoardError::HasAssignedTasks`] when `task_count` is non-zero
pub fn ensure_user_deletable(task_count: i64) -> Result<(), BoardError> {
    if task_count > 0 {
        return Err(BoardError::HasAssignedTasks { task_count });
    }
    Ok(())
}

/// An assigned task was about to be deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Cannot delete a task that is assigned to a user. Unassign it first.")]
pub struct TaskDeleteBlocked {
    pub task_id: i32,
    pub assignee_id: i32,
}

/// Checks that a task can be deleted from the board
pub fn ensure_task_deletable(task: &Task) -> Result<(), TaskDeleteBlocked> {
    match task.assignee_id {
        Some(assignee_id) => Err(TaskDeleteBlocked {
            task_id: task.id,
            assignee_id,
        }),
        None => Ok(()),
    }
}
