//! # Taskboard Client Library
//!
//! Client-side board state with optimistic updates. Changes are applied to
//! the local store first, sent to the server, then either confirmed with the
//! server's record or rolled back.
//!
//! ## Modules
//!
//! - `api`: Board API trait with HTTP and mock implementations
//! - `session`: Board session running the optimistic update cycle
//! - `store`: Immutable task store snapshots
//! - `notify`: Success and error notifications
//! - `error`: Client error types
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use taskboard_client::api::MockBoardApi;
//! use taskboard_client::notify::Notifier;
//! use taskboard_client::session::BoardSession;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let (notifier, _notifications) = Notifier::channel();
//! let mut session = BoardSession::new(Arc::new(MockBoardApi::new()), notifier);
//! assert!(session.load().await.success);
//! assert_eq!(session.columns().len(), 3);
//! # }
//! ```

pub mod api;
pub mod error;
pub mod notify;
pub mod session;
pub mod store;
