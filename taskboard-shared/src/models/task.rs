/// Task model and database operations
///
/// Tasks are the cards on the board. A task's `status` and `column_id` are
/// kept consistent by [`crate::service::BoardService`]: every status change
/// goes through a [`Placement`], which moves the task to the matching column
/// and appends it to the end of that column.
///
/// # State Machine
///
/// ```text
/// todo ⇄ in-progress ⇄ done
///   ⇅__________________⇅
/// ```
///
/// Any status is reachable from any other in one step; none is terminal.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('todo', 'in-progress', 'done');
///
/// CREATE TABLE tasks (
///     id SERIAL PRIMARY KEY,
///     title TEXT NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'todo',
///     assignee_id INTEGER REFERENCES users(id),
///     column_id INTEGER NOT NULL REFERENCES columns(id) ON DELETE CASCADE,
///     sort_order INTEGER NOT NULL DEFAULT 0 CHECK (sort_order >= 0),
///     version INTEGER NOT NULL DEFAULT 1,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Versions
///
/// Every successful write increments `version`. Writers may pass the version
/// they last saw; a mismatch leaves the row untouched so the caller can
/// report a stale write instead of overwriting a newer change.

use crate::models::user::User;
use crate::status::TaskStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use validator::Validate;

const TASK_COLUMNS: &str =
    "id, title, description, status, assignee_id, column_id, sort_order, version, created_at, updated_at";

/// A task card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Task ID
    pub id: i32,

    /// Short title
    pub title: String,

    /// Optional long description
    pub description: Option<String>,

    /// Current status
    pub status: TaskStatus,

    /// Assigned user, if any
    pub assignee_id: Option<i32>,

    /// Column matching `status`
    pub column_id: i32,

    /// Display position within the status group
    #[sqlx(rename = "sort_order")]
    pub order: i32,

    /// Write counter for stale-write detection
    pub version: i32,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// A task with its assignee resolved
///
/// Serializes as the task's fields plus an `assignee` object when assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDetails {
    /// The task row
    #[serde(flatten)]
    pub task: Task,

    /// Denormalized assignee
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<User>,
}

impl TaskDetails {
    /// Pairs a task with its assignee looked up in `users`
    pub fn resolve(task: Task, users: &[User]) -> Self {
        let assignee = task
            .assignee_id
            .and_then(|id| users.iter().find(|user| user.id == id).cloned());
        Self { task, assignee }
    }
}

/// Target column for a status change
///
/// Applying a placement sets `status` and `column_id` together and appends
/// the task (order = number of other tasks already in the column).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// New status
    pub status: TaskStatus,

    /// Column resolved for `status`
    pub column_id: i32,
}

/// Row data for inserting a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub assignee_id: Option<i32>,
    pub column_id: i32,

    /// Explicit position; None appends to the end of the column
    pub order: Option<i32>,
}

/// Partial update of a task
///
/// Only `Some` fields are written. Nested options distinguish "leave alone"
/// (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub assignee_id: Option<Option<i32>>,
    pub placement: Option<Placement>,
}

/// Create-task request (task dialog)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskInput {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Defaults to `todo`
    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub assignee_id: Option<i32>,
}

/// Update-task request (task dialog edit)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskInput {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    pub status: TaskStatus,

    #[serde(default)]
    pub assignee_id: Option<i32>,

    /// Version the editor last saw
    #[serde(default)]
    pub version: Option<i32>,
}

/// Status change request (drag and drop)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveTaskInput {
    pub status: TaskStatus,

    #[serde(default)]
    pub version: Option<i32>,
}

/// Assignment request
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignTaskInput {
    pub assignee_id: Option<i32>,

    #[serde(default)]
    pub version: Option<i32>,
}

/// Locks the column row and counts the tasks already in it
///
/// Holding the row lock until commit serializes concurrent writers appending
/// to the same column, so two movers cannot both read the same count.
async fn next_order_in_column(
    tx: &mut Transaction<'_, Postgres>,
    column_id: i32,
    exclude_task: Option<i32>,
) -> Result<i32, sqlx::Error> {
    sqlx::query("SELECT id FROM columns WHERE id = $1 FOR UPDATE")
        .bind(column_id)
        .fetch_optional(&mut **tx)
        .await?;

    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM tasks WHERE column_id = $1 AND ($2::INT4 IS NULL OR id <> $2)",
    )
    .bind(column_id)
    .bind(exclude_task)
    .fetch_one(&mut **tx)
    .await?;

    Ok(i32::try_from(count).unwrap_or(i32::MAX))
}

impl Task {
    /// Inserts a task
    ///
    /// When `data.order` is None the order is computed inside the same
    /// transaction as the insert.
    pub async fn create(pool: &PgPool, data: NewTask) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let order = match data.order {
            Some(order) => order,
            None => next_order_in_column(&mut tx, data.column_id, None).await?,
        };

        let query = format!(
            "INSERT INTO tasks (title, description, status, assignee_id, column_id, sort_order) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {TASK_COLUMNS}"
        );

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(data.title)
            .bind(data.description)
            .bind(data.status)
            .bind(data.assignee_id)
            .bind(data.column_id)
            .bind(order)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists all tasks by display order
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY sort_order ASC, id ASC");
        sqlx::query_as::<_, Task>(&query).fetch_all(pool).await
    }

    /// Lists tasks assigned to a user, ordered by status then title
    pub async fn list_by_assignee(pool: &PgPool, user_id: i32) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE assignee_id = $1 ORDER BY status ASC, title ASC"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Counts tasks in a column
    pub async fn count_by_column(pool: &PgPool, column_id: i32) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE column_id = $1")
            .bind(column_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Number of tasks per assignee (assigned users only)
    pub async fn assigned_counts(pool: &PgPool) -> Result<Vec<(i32, i64)>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT assignee_id, COUNT(*)
            FROM tasks
            WHERE assignee_id IS NOT NULL
            GROUP BY assignee_id
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Applies a partial update
    ///
    /// # Returns
    ///
    /// The updated task, or None when the task does not exist or its version
    /// differs from `expected_version`.
    pub async fn update(
        pool: &PgPool,
        id: i32,
        changes: TaskChanges,
        expected_version: Option<i32>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let order = match changes.placement {
            Some(placement) => Some(next_order_in_column(&mut tx, placement.column_id, Some(id)).await?),
            None => None,
        };

        // $1 = id, $2 = expected version
        let mut query = String::from("UPDATE tasks SET updated_at = NOW(), version = version + 1");
        let mut bind_count = 2;

        if changes.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if changes.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if changes.assignee_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", assignee_id = ${}", bind_count));
        }
        if changes.placement.is_some() {
            query.push_str(&format!(
                ", status = ${}, column_id = ${}, sort_order = ${}",
                bind_count + 1,
                bind_count + 2,
                bind_count + 3
            ));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND ($2::INT4 IS NULL OR version = $2) RETURNING {TASK_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(expected_version);

        if let Some(title) = changes.title {
            q = q.bind(title);
        }
        if let Some(description) = changes.description {
            q = q.bind(description);
        }
        if let Some(assignee_id) = changes.assignee_id {
            q = q.bind(assignee_id);
        }
        if let (Some(placement), Some(order)) = (changes.placement, order) {
            q = q.bind(placement.status).bind(placement.column_id).bind(order);
        }

        let task = q.fetch_optional(&mut *tx).await?;
        tx.commit().await?;

        Ok(task)
    }

    /// Deletes a task
    ///
    /// # Returns
    ///
    /// True if a task was deleted
    pub async fn delete(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task() -> Task {
        let now = Utc::now();
        Task {
            id: 5,
            title: "Design Homepage".to_string(),
            description: None,
            status: TaskStatus::Todo,
            assignee_id: Some(9),
            column_id: 1,
            order: 0,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_task_wire_format() {
        let json = serde_json::to_value(sample_task()).unwrap();
        assert_eq!(json["status"], "todo");
        assert_eq!(json["assigneeId"], 9);
        assert_eq!(json["columnId"], 1);
        assert_eq!(json["order"], 0);
    }

    #[test]
    fn test_details_flatten_and_omit_missing_assignee() {
        let mut task = sample_task();
        task.assignee_id = None;
        let details = TaskDetails::resolve(task, &[]);
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["id"], 5);
        assert!(json.get("assignee").is_none());

        let back: TaskDetails = serde_json::from_value(json).unwrap();
        assert_eq!(back, details);
    }

    #[test]
    fn test_details_resolves_assignee_from_roster() {
        let now = Utc::now();
        let user = User {
            id: 9,
            name: "Riley Brown".to_string(),
            email: "riley.brown@example.com".to_string(),
            role: None,
            avatar: None,
            created_at: now,
            updated_at: now,
        };
        let details = TaskDetails::resolve(sample_task(), std::slice::from_ref(&user));
        assert_eq!(details.assignee, Some(user));

        // Unknown assignee ids resolve to no assignee object
        let details = TaskDetails::resolve(sample_task(), &[]);
        assert!(details.assignee.is_none());
    }

    #[test]
    fn test_create_input_defaults() {
        let input: CreateTaskInput = serde_json::from_str(r#"{"title":"Write docs"}"#).unwrap();
        assert_eq!(input.status, TaskStatus::Todo);
        assert!(input.assignee_id.is_none());
        assert!(input.validate().is_ok());

        let empty: CreateTaskInput = serde_json::from_str(r#"{"title":""}"#).unwrap();
        assert!(empty.validate().is_err());
    }
}
