/// Column model and database operations
///
/// Columns are the named, ordered buckets of the board. The three semantic
/// columns ("To Do", "In Progress", "Done") are created at seed time and are
/// never created or deleted by normal board flow.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE columns (
///     id SERIAL PRIMARY KEY,
///     name TEXT NOT NULL,
///     sort_order INTEGER NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

/// A board column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Column ID
    pub id: i32,

    /// Display name; matched against status labels
    pub name: String,

    /// Position on the board (ascending)
    #[sqlx(rename = "sort_order")]
    pub order: i32,

    /// When the column was created
    pub created_at: DateTime<Utc>,

    /// When the column was last updated
    pub updated_at: DateTime<Utc>,
}

impl Column {
    /// Builds a column value stamped with the current time
    pub fn new(id: i32, name: impl Into<String>, order: i32) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            order,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for creating a column
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateColumn {
    /// Column name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Board position (defaults to 0)
    #[serde(default)]
    #[validate(range(min = 0, message = "Order must be non-negative"))]
    pub order: i32,
}

impl Column {
    /// Inserts a new column
    pub async fn create(pool: &PgPool, data: CreateColumn) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Column>(
            r#"
            INSERT INTO columns (name, sort_order)
            VALUES ($1, $2)
            RETURNING id, name, sort_order, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.order)
        .fetch_one(pool)
        .await
    }

    /// Lists all columns ordered by board position
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Column>(
            r#"
            SELECT id, name, sort_order, created_at, updated_at
            FROM columns
            ORDER BY sort_order ASC, id ASC
            "#,
        )
        .fetch_all(pool)
        .await
    }
}
