/// Client error types
///
/// Every failure a board action can hit ends up here. Server rejections keep
/// the decoded JSON body so field errors and the assigned-task count survive
/// the trip back to the caller.

use taskboard_shared::error::{BoardError, ErrorBody};
use taskboard_shared::guard::TaskDeleteBlocked;
use taskboard_shared::status::ConfigurationError;

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Client operation failure
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Server answered with a non-success status
    #[error("{}", .0.error)]
    Rejected(ErrorBody),

    /// Request never produced a usable response
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Local column set cannot place the status
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Task id is not in the local store
    #[error("Task {0} is not on the board")]
    UnknownTask(i32),

    /// Local deletion guard refused the delete
    #[error(transparent)]
    DeleteBlocked(#[from] TaskDeleteBlocked),

    /// Base URL could not be parsed
    #[error("Invalid API URL '{0}'")]
    InvalidUrl(String),
}

impl ClientError {
    /// Decoded server body, if the server rejected the request
    pub fn body(&self) -> Option<&ErrorBody> {
        match self {
            ClientError::Rejected(body) => Some(body),
            _ => None,
        }
    }

    /// Message shown to the user
    ///
    /// Server and guard messages are shown as-is; transport problems fall back
    /// to the action's generic description.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Rejected(body) if !body.error.is_empty() => body.error.clone(),
            ClientError::Configuration(err) => err.to_string(),
            ClientError::DeleteBlocked(err) => err.to_string(),
            _ => fallback.to_string(),
        }
    }
}

impl From<BoardError> for ClientError {
    fn from(err: BoardError) -> Self {
        ClientError::Rejected(ErrorBody::from(&err))
    }
}
