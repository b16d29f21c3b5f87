/// User model and database operations
///
/// Users are the team members tasks can be assigned to. A user can only be
/// deleted while no task references it as assignee (see [`crate::guard`]).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id SERIAL PRIMARY KEY,
///     name TEXT NOT NULL,
///     email TEXT NOT NULL UNIQUE,
///     role TEXT,
///     avatar TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::user::{User, CreateUser};
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     name: "Alex Johnson".to_string(),
///     email: "alex.johnson@example.com".to_string(),
///     role: Some("Frontend Developer".to_string()),
///     avatar: None,
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// println!("Created user: {}", user.id);
///
/// let found = User::find_by_email(&pool, "alex.johnson@example.com").await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

/// A team member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User ID
    pub id: i32,

    /// Display name
    pub name: String,

    /// Email address, unique across users
    pub email: String,

    /// Optional job title
    pub role: Option<String>,

    /// Optional avatar URL or data URI
    pub avatar: Option<String>,

    /// When the user was created
    pub created_at: DateTime<Utc>,

    /// When the user was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    /// Display name
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Optional role
    #[serde(default)]
    pub role: Option<String>,

    /// Optional avatar
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Input for updating a user
///
/// Updates replace every field. A missing avatar keeps the stored one, so a
/// profile edit without a new picture does not erase the old picture.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    /// Display name
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Role (None clears it)
    #[serde(default)]
    pub role: Option<String>,

    /// New avatar (None keeps the current one)
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Result of [`User::delete_unassigned`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserDeletion {
    /// The user was removed
    Deleted,

    /// No user has this ID
    NotFound,

    /// The user is still the assignee of this many tasks
    HasAssignedTasks(i64),
}

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns an error if the email already exists (unique constraint
    /// violation) or the database connection fails.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, role, avatar)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, role, avatar, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.email)
        .bind(data.role)
        .bind(data.avatar)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, role, avatar, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address (exact match)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, role, avatar, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Replaces a user's fields
    ///
    /// `data.avatar` of `None` keeps the stored avatar.
    ///
    /// # Returns
    ///
    /// The updated user, or None if no user has this ID
    pub async fn update(
        pool: &PgPool,
        id: i32,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $2,
                email = $3,
                role = $4,
                avatar = COALESCE($5, avatar),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, role, avatar, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.email)
        .bind(data.role)
        .bind(data.avatar)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Deletes a user unless a task still references it
    ///
    /// The user row is locked for the duration of the check so a concurrent
    /// assignment cannot slip in between the count and the delete.
    pub async fn delete_unassigned(pool: &PgPool, id: i32) -> Result<UserDeletion, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked: Option<(i32,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        if locked.is_none() {
            return Ok(UserDeletion::NotFound);
        }

        let (task_count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE assignee_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        if task_count > 0 {
            return Ok(UserDeletion::HasAssignedTasks(task_count));
        }

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(UserDeletion::Deleted)
    }

    /// Lists all users ordered by name (descending)
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, role, avatar, created_at, updated_at
            FROM users
            ORDER BY name DESC, id ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Counts total number of users
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_validation() {
        let valid = CreateUser {
            name: "Taylor Smith".to_string(),
            email: "taylor.smith@example.com".to_string(),
            role: Some("UI/UX Designer".to_string()),
            avatar: None,
        };
        assert!(valid.validate().is_ok());

        let invalid = CreateUser {
            name: String::new(),
            email: "not-an-email".to_string(),
            role: None,
            avatar: None,
        };
        let errors = invalid.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn test_create_user_optional_fields_default() {
        let input: CreateUser =
            serde_json::from_str(r#"{"name":"Jordan Lee","email":"jordan.lee@example.com"}"#)
                .unwrap();
        assert!(input.role.is_none());
        assert!(input.avatar.is_none());
    }

    #[test]
    fn test_user_serializes_camel_case() {
        let now = Utc::now();
        let user = User {
            id: 9,
            name: "Morgan Chen".to_string(),
            email: "morgan.chen@example.com".to_string(),
            role: None,
            avatar: None,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"], 9);
        assert!(json["role"].is_null());
        assert!(json.get("updatedAt").is_some());
    }
}
