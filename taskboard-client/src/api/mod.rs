/// Board API access
///
/// The session reaches the server only through the [`BoardApi`] trait.
///
/// # Implementations
///
/// - **Http**: `reqwest` client for a running taskboard server
/// - **Mock**: In-process board with failure injection, for tests and demos
///
/// # Example
///
/// ```no_run
/// use taskboard_client::api::{BoardApi, HttpBoardApi};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let api = HttpBoardApi::new("http://localhost:8080")?;
/// let board = api.board().await?;
/// println!("{} tasks on the board", board.tasks.len());
/// # Ok(())
/// # }
/// ```

pub mod board_api;
pub mod http;
pub mod mock;

pub use board_api::BoardApi;
pub use http::HttpBoardApi;
pub use mock::MockBoardApi;
