/// Database models for Taskboard
///
/// This module contains the three board entities and their PostgreSQL
/// operations.
///
/// # Models
///
/// - `user`: Team members that tasks are assigned to
/// - `column`: The fixed, ordered status columns
/// - `task`: Task cards, their placement, and request inputs
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::column::Column;
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// for column in Column::list(&pool).await? {
///     println!("{} (order {})", column.name, column.order);
/// }
/// # Ok(())
/// # }
/// ```

pub mod column;
pub mod task;
pub mod user;
