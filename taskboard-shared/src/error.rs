/// Board error taxonomy
///
/// Every board operation returns [`BoardResult`]. The variants map one to one
/// onto the failure kinds the board UI distinguishes:
///
/// | variant | meaning | HTTP |
/// |---|---|---|
/// | `Validation` | bad input shape, with per-field messages | 400 |
/// | `NotFound` | stale or unknown id | 404 |
/// | `DuplicateEmail` | email belongs to another user | 409 |
/// | `HasAssignedTasks` | user still referenced by tasks | 409 |
/// | `StaleWrite` | task changed since the caller read it | 409 |
/// | `Configuration` | a status column is missing | 500 |
/// | `Persistence` | database or transport failure | 500 |
///
/// [`ErrorBody`] is the JSON shape every failed request carries, shared by
/// the server (which produces it) and the client (which decodes it).

use crate::status::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::ValidationErrors;

/// Field name → first validation message
pub type FieldErrors = BTreeMap<String, String>;

/// Result alias for board operations
pub type BoardResult<T> = Result<T, BoardError>;

/// Board operation failure
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BoardError {
    /// Input failed validation
    #[error("Validation failed")]
    Validation(FieldErrors),

    /// Referenced entity does not exist
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: i32 },

    /// Email already used by a different user
    #[error("Email already in use")]
    DuplicateEmail,

    /// User cannot be deleted while tasks reference it
    #[error("Cannot delete this user as they have {task_count} {} assigned.", task_noun(.task_count))]
    HasAssignedTasks { task_count: i64 },

    /// Status column missing from the board
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Write based on an outdated version
    #[error("Task {id} was changed by someone else (expected version {expected}, found {actual})")]
    StaleWrite { id: i32, expected: i32, actual: i32 },

    /// Storage failure
    #[error("Persistence error: {0}")]
    Persistence(String),
}

fn task_noun(count: &i64) -> &'static str {
    if *count == 1 {
        "task"
    } else {
        "tasks"
    }
}

impl BoardError {
    /// Validation failure on a single field
    pub fn field(field: &str, message: &str) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), message.to_string());
        BoardError::Validation(errors)
    }

    /// Not-found error for a task
    pub fn task_not_found(id: i32) -> Self {
        BoardError::NotFound { entity: "Task", id }
    }

    /// Not-found error for a user
    pub fn user_not_found(id: i32) -> Self {
        BoardError::NotFound { entity: "User", id }
    }

    /// Validation failure for an assignee id with no matching user
    pub fn unknown_assignee() -> Self {
        BoardError::field("assigneeId", "Assignee does not exist")
    }

    /// Whether the error comes from bad input rather than the system
    pub fn is_client_error(&self) -> bool {
        !matches!(self, BoardError::Configuration(_) | BoardError::Persistence(_))
    }
}

impl From<ValidationErrors> for BoardError {
    fn from(errors: ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let message = errors
                    .first()
                    .and_then(|error| error.message.as_ref())
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| "Invalid value".to_string());
                (to_camel_case(&field), message)
            })
            .collect();

        BoardError::Validation(fields)
    }
}

impl From<sqlx::Error> for BoardError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if let Some(constraint) = db_err.constraint() {
                if constraint.contains("email") {
                    return BoardError::DuplicateEmail;
                }
                if constraint.contains("assignee") {
                    return BoardError::unknown_assignee();
                }
            }
        }

        BoardError::Persistence(err.to_string())
    }
}

fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for ch in field.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// JSON body of every failed request
///
/// ```json
/// {
///   "error": "Cannot delete this user as they have 1 task assigned.",
///   "hasAssignedTasks": true,
///   "taskCount": 1
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Human-readable message
    pub error: String,

    /// Per-field validation messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<FieldErrors>,

    /// Set when a user delete was refused because of assigned tasks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_assigned_tasks: Option<bool>,

    /// Number of tasks still assigned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_count: Option<i64>,
}

impl ErrorBody {
    /// Body with only a message
    pub fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            field_errors: None,
            has_assigned_tasks: None,
            task_count: None,
        }
    }
}

impl From<&BoardError> for ErrorBody {
    fn from(err: &BoardError) -> Self {
        match err {
            BoardError::Validation(fields) => Self {
                field_errors: Some(fields.clone()),
                ..Self::message("Validation failed")
            },
            BoardError::DuplicateEmail => {
                let mut fields = FieldErrors::new();
                fields.insert("email".to_string(), "This email is already in use".to_string());
                Self {
                    field_errors: Some(fields),
                    ..Self::message(err.to_string())
                }
            }
            BoardError::HasAssignedTasks { task_count } => Self {
                has_assigned_tasks: Some(true),
                task_count: Some(*task_count),
                ..Self::message(err.to_string())
            },
            // Storage details stay in the server log
            BoardError::Persistence(_) => Self::message("An internal error occurred"),
            _ => Self::message(err.to_string()),
        }
    }
}
