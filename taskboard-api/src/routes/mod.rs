/// API route handlers, organized by resource
///
/// - `health`: Health check endpoint
/// - `board`: Whole-board snapshot
/// - `columns`: Column listing and creation
/// - `tasks`: Task CRUD, drag-and-drop moves, assignment
/// - `users`: User CRUD, per-user tasks and counts

pub mod board;
pub mod columns;
pub mod health;
pub mod tasks;
pub mod users;
