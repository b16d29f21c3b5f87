/// In-memory board repository
///
/// Keeps the whole board in one mutex-guarded state value. Every operation
/// takes the lock once, so the order count and the task write in a
/// placement can never interleave with another writer.
///
/// Used by tests and by the server when no `DATABASE_URL` is configured.
/// Foreign keys, the unique email index and task versions are emulated to
/// match the PostgreSQL backend.

use super::BoardRepository;
use crate::error::{BoardError, BoardResult};
use crate::guard::ensure_user_deletable;
use crate::models::column::{Column, CreateColumn};
use crate::models::task::{NewTask, Task, TaskChanges};
use crate::models::user::{CreateUser, UpdateUser, User};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct BoardState {
    columns: Vec<Column>,
    tasks: Vec<Task>,
    users: Vec<User>,
    last_column_id: i32,
    last_task_id: i32,
    last_user_id: i32,
}

impl BoardState {
    fn order_in_column(&self, column_id: i32, exclude_task: Option<i32>) -> i32 {
        let count = self
            .tasks
            .iter()
            .filter(|task| task.column_id == column_id && Some(task.id) != exclude_task)
            .count();
        i32::try_from(count).unwrap_or(i32::MAX)
    }

    fn check_references(&self, column_id: i32, assignee_id: Option<i32>) -> BoardResult<()> {
        if !self.columns.iter().any(|column| column.id == column_id) {
            return Err(BoardError::Persistence(format!(
                "foreign key violation: column {column_id} does not exist"
            )));
        }
        if let Some(user_id) = assignee_id {
            if !self.users.iter().any(|user| user.id == user_id) {
                return Err(BoardError::unknown_assignee());
            }
        }
        Ok(())
    }

    fn email_taken(&self, email: &str, except: Option<i32>) -> bool {
        self.users
            .iter()
            .any(|user| user.email == email && Some(user.id) != except)
    }
}

/// Repository holding the board in process memory
#[derive(Debug, Default)]
pub struct InMemoryBoardRepository {
    state: Mutex<BoardState>,
}

impl InMemoryBoardRepository {
    /// Empty board (no columns)
    pub fn new() -> Self {
        Self::default()
    }

    /// Board with the given columns already in place
    pub fn with_columns(columns: Vec<Column>) -> Self {
        let last_column_id = columns.iter().map(|column| column.id).max().unwrap_or(0);
        Self {
            state: Mutex::new(BoardState {
                columns,
                last_column_id,
                ..Default::default()
            }),
        }
    }

    fn state(&self) -> BoardResult<MutexGuard<'_, BoardState>> {
        self.state
            .lock()
            .map_err(|_| BoardError::Persistence("board state lock poisoned".to_string()))
    }
}

#[async_trait]
impl BoardRepository for InMemoryBoardRepository {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> BoardResult<()> {
        self.state().map(|_| ())
    }

    async fn list_columns(&self) -> BoardResult<Vec<Column>> {
        let mut columns = self.state()?.columns.clone();
        columns.sort_by_key(|column| (column.order, column.id));
        Ok(columns)
    }

    async fn create_column(&self, data: CreateColumn) -> BoardResult<Column> {
        let mut state = self.state()?;
        state.last_column_id += 1;
        let column = Column::new(state.last_column_id, data.name, data.order);
        state.columns.push(column.clone());
        Ok(column)
    }

    async fn list_tasks(&self) -> BoardResult<Vec<Task>> {
        let mut tasks = self.state()?.tasks.clone();
        tasks.sort_by_key(|task| (task.order, task.id));
        Ok(tasks)
    }

    async fn find_task(&self, id: i32) -> BoardResult<Option<Task>> {
        Ok(self.state()?.tasks.iter().find(|task| task.id == id).cloned())
    }

    async fn tasks_for_assignee(&self, user_id: i32) -> BoardResult<Vec<Task>> {
        let mut tasks: Vec<Task> = self
            .state()?
            .tasks
            .iter()
            .filter(|task| task.assignee_id == Some(user_id))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| a.status.cmp(&b.status).then_with(|| a.title.cmp(&b.title)));
        Ok(tasks)
    }

    async fn count_tasks_in_column(&self, column_id: i32) -> BoardResult<i64> {
        let state = self.state()?;
        Ok(state.tasks.iter().filter(|task| task.column_id == column_id).count() as i64)
    }

    async fn assigned_task_counts(&self) -> BoardResult<Vec<(i32, i64)>> {
        let mut counts: BTreeMap<i32, i64> = BTreeMap::new();
        for user_id in self.state()?.tasks.iter().filter_map(|task| task.assignee_id) {
            *counts.entry(user_id).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }

    async fn create_task(&self, data: NewTask) -> BoardResult<Task> {
        let mut state = self.state()?;
        state.check_references(data.column_id, data.assignee_id)?;

        let order = match data.order {
            Some(order) => order,
            None => state.order_in_column(data.column_id, None),
        };

        state.last_task_id += 1;
        let now = Utc::now();
        let task = Task {
            id: state.last_task_id,
            title: data.title,
            description: data.description,
            status: data.status,
            assignee_id: data.assignee_id,
            column_id: data.column_id,
            order,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn update_task(
        &self,
        id: i32,
        changes: TaskChanges,
        expected_version: Option<i32>,
    ) -> BoardResult<Task> {
        let mut state = self.state()?;

        let current = state
            .tasks
            .iter()
            .find(|task| task.id == id)
            .cloned()
            .ok_or_else(|| BoardError::task_not_found(id))?;

        if let Some(expected) = expected_version {
            if expected != current.version {
                return Err(BoardError::StaleWrite {
                    id,
                    expected,
                    actual: current.version,
                });
            }
        }

        let column_id = changes
            .placement
            .map(|placement| placement.column_id)
            .unwrap_or(current.column_id);
        let assignee_id = changes.assignee_id.unwrap_or(current.assignee_id);
        state.check_references(column_id, assignee_id)?;

        let order = changes
            .placement
            .map(|placement| state.order_in_column(placement.column_id, Some(id)));

        let task = state
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| BoardError::task_not_found(id))?;

        if let Some(title) = changes.title {
            task.title = title;
        }
        if let Some(description) = changes.description {
            task.description = description;
        }
        task.assignee_id = assignee_id;
        if let (Some(placement), Some(order)) = (changes.placement, order) {
            task.status = placement.status;
            task.column_id = placement.column_id;
            task.order = order;
        }
        task.version += 1;
        task.updated_at = Utc::now();

        Ok(task.clone())
    }

    async fn delete_task(&self, id: i32) -> BoardResult<()> {
        let mut state = self.state()?;
        let before = state.tasks.len();
        state.tasks.retain(|task| task.id != id);

        if state.tasks.len() == before {
            return Err(BoardError::task_not_found(id));
        }
        Ok(())
    }

    async fn list_users(&self) -> BoardResult<Vec<User>> {
        let mut users = self.state()?.users.clone();
        users.sort_by(|a, b| b.name.cmp(&a.name).then_with(|| a.id.cmp(&b.id)));
        Ok(users)
    }

    async fn find_user(&self, id: i32) -> BoardResult<Option<User>> {
        Ok(self.state()?.users.iter().find(|user| user.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> BoardResult<Option<User>> {
        Ok(self
            .state()?
            .users
            .iter()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn create_user(&self, data: CreateUser) -> BoardResult<User> {
        let mut state = self.state()?;
        if state.email_taken(&data.email, None) {
            return Err(BoardError::DuplicateEmail);
        }

        state.last_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: state.last_user_id,
            name: data.name,
            email: data.email,
            role: data.role,
            avatar: data.avatar,
            created_at: now,
            updated_at: now,
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: i32, data: UpdateUser) -> BoardResult<User> {
        let mut state = self.state()?;
        if !state.users.iter().any(|user| user.id == id) {
            return Err(BoardError::user_not_found(id));
        }
        if state.email_taken(&data.email, Some(id)) {
            return Err(BoardError::DuplicateEmail);
        }

        let user = state
            .users
            .iter_mut()
            .find(|user| user.id == id)
            .ok_or_else(|| BoardError::user_not_found(id))?;

        user.name = data.name;
        user.email = data.email;
        user.role = data.role;
        if data.avatar.is_some() {
            user.avatar = data.avatar;
        }
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn delete_user(&self, id: i32) -> BoardResult<()> {
        let mut state = self.state()?;
        if !state.users.iter().any(|user| user.id == id) {
            return Err(BoardError::user_not_found(id));
        }

        let task_count = state
            .tasks
            .iter()
            .filter(|task| task.assignee_id == Some(id))
            .count() as i64;
        ensure_user_deletable(task_count)?;

        state.users.retain(|user| user.id != id);
        Ok(())
    }

    async fn count_users(&self) -> BoardResult<i64> {
        Ok(self.state()?.users.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::Placement;
    use crate::status::TaskStatus;
    use std::sync::Arc;

    fn board() -> InMemoryBoardRepository {
        InMemoryBoardRepository::with_columns(vec![
            Column::new(1, "To Do", 1),
            Column::new(2, "In Progress", 2),
            Column::new(3, "Done", 3),
        ])
    }

    fn new_task(title: &str, status: TaskStatus, column_id: i32) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: None,
            status,
            assignee_id: None,
            column_id,
            order: None,
        }
    }

    #[tokio::test]
    async fn test_with_columns_continues_id_sequence() {
        let repo = board();
        let column = repo
            .create_column(CreateColumn {
                name: "Review".to_string(),
                order: 4,
            })
            .await
            .unwrap();
        assert_eq!(column.id, 4);
    }

    #[tokio::test]
    async fn test_assignee_must_exist() {
        let repo = board();
        let mut data = new_task("Orphan", TaskStatus::Todo, 1);
        data.assignee_id = Some(99);

        let err = repo.create_task(data).await.unwrap_err();
        assert_eq!(err, BoardError::unknown_assignee());
    }

    #[tokio::test]
    async fn test_concurrent_moves_get_distinct_orders() {
        let repo = Arc::new(board());
        for i in 0..8 {
            repo.create_task(new_task(&format!("Task {i}"), TaskStatus::Todo, 1))
                .await
                .unwrap();
        }

        let placement = Placement {
            status: TaskStatus::Done,
            column_id: 3,
        };
        let handles: Vec<_> = (1..=8)
            .map(|id| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move { repo.move_task(id, placement, None).await })
            })
            .collect();

        let mut orders = Vec::new();
        for handle in handles {
            orders.push(handle.await.unwrap().unwrap().order);
        }
        orders.sort_unstable();
        assert_eq!(orders, (0..8).collect::<Vec<_>>());
    }
}
