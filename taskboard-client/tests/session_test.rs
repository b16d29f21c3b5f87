/// Board session tests
///
/// Each test drives a session against the in-process mock API, which runs the
/// real board rules over an in-memory repository.

use std::sync::Arc;
use taskboard_client::api::MockBoardApi;
use taskboard_client::notify::{Notification, NotificationKind, Notifier};
use taskboard_client::session::BoardSession;
use taskboard_client::store::TaskUpdate;
use taskboard_shared::error::ErrorBody;
use taskboard_shared::models::column::Column;
use taskboard_shared::models::task::{CreateTaskInput, UpdateTaskInput};
use taskboard_shared::models::user::CreateUser;
use taskboard_shared::status::{ColumnMap, TaskStatus};
use tokio::sync::mpsc::UnboundedReceiver;

struct Harness {
    api: Arc<MockBoardApi>,
    session: BoardSession,
    notifications: UnboundedReceiver<Notification>,
}

impl Harness {
    async fn new() -> Self {
        Self::with_api(MockBoardApi::new()).await
    }

    async fn with_api(api: MockBoardApi) -> Self {
        let api = Arc::new(api);
        let (notifier, notifications) = Notifier::channel();
        let session = BoardSession::new(api.clone(), notifier);
        Harness {
            api,
            session,
            notifications,
        }
    }

    /// Seeds the backing board directly, without counting requests
    async fn add_task(&self, title: &str, status: TaskStatus, assignee_id: Option<i32>) -> i32 {
        self.api
            .service()
            .create_task(CreateTaskInput {
                title: title.to_string(),
                description: None,
                status,
                assignee_id,
            })
            .await
            .unwrap()
            .task
            .id
    }

    async fn add_user(&self, name: &str) -> i32 {
        self.api
            .service()
            .create_user(CreateUser {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
                role: Some("Developer".to_string()),
                avatar: None,
            })
            .await
            .unwrap()
            .id
    }

    async fn load(&mut self) {
        assert!(self.session.load().await.success);
    }

    fn last_notification(&mut self) -> Notification {
        let mut last = None;
        while let Ok(notification) = self.notifications.try_recv() {
            last = Some(notification);
        }
        last.expect("no notification emitted")
    }

    fn assert_column_consistent(&self) {
        let map = ColumnMap::from_columns(self.session.columns()).unwrap();
        for details in self.session.store().tasks() {
            assert!(
                map.is_consistent(details.task.status, details.task.column_id),
                "task {} has status {} in column {}",
                details.task.id,
                details.task.status,
                details.task.column_id
            );
        }
    }
}

#[tokio::test]
async fn test_load_populates_board() {
    let mut h = Harness::new().await;
    h.add_user("Alex Johnson").await;
    h.add_task("Setup Project", TaskStatus::Todo, None).await;

    h.load().await;

    assert_eq!(h.session.columns().len(), 3);
    assert_eq!(h.session.users().len(), 1);
    assert_eq!(h.session.store().len(), 1);
}

#[tokio::test]
async fn test_load_failure_notifies() {
    let mut h = Harness::new().await;
    h.api.fail_next(ErrorBody::message("Service unavailable")).await;

    let result = h.session.load().await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Service unavailable"));
    assert!(h.last_notification().is_error());
}

#[tokio::test]
async fn test_move_into_in_progress_appends() {
    let mut h = Harness::new().await;
    h.add_task("Design UI", TaskStatus::InProgress, None).await;
    h.add_task("API Integration", TaskStatus::InProgress, None).await;
    let id = h.add_task("Setup Project", TaskStatus::Todo, None).await;
    h.load().await;

    let result = h.session.move_task(id, TaskStatus::InProgress).await;

    assert!(result.success);
    let task = &h.session.task(id).unwrap().task;
    assert_eq!(task.status, TaskStatus::InProgress);
    assert_eq!(task.column_id, 2);
    assert_eq!(task.order, 2);
    h.assert_column_consistent();

    let notification = h.last_notification();
    assert_eq!(notification.kind, NotificationKind::Success);
    assert_eq!(notification.title, "Task moved");
    assert_eq!(notification.description, "Task moved to In Progress");
}

#[tokio::test]
async fn test_failed_move_restores_snapshot() {
    let mut h = Harness::new().await;
    let id = h.add_task("Setup Project", TaskStatus::Todo, None).await;
    h.load().await;
    let before = h.session.store().clone();

    h.api.fail_next(ErrorBody::message("Database unavailable")).await;
    let result = h.session.move_task(id, TaskStatus::Done).await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Database unavailable"));
    assert_eq!(h.session.store(), &before);
    h.assert_column_consistent();

    let notification = h.last_notification();
    assert_eq!(notification.title, "Error");
    assert_eq!(notification.description, "Database unavailable");
}

#[tokio::test]
async fn test_move_to_same_status_sends_nothing() {
    let mut h = Harness::new().await;
    let id = h.add_task("Setup Project", TaskStatus::Done, None).await;
    h.load().await;
    let requests = h.api.requests();
    let before = h.session.store().clone();

    assert!(h.session.move_task(id, TaskStatus::Done).await.success);
    assert!(h.session.move_task(id, TaskStatus::Done).await.success);

    assert_eq!(h.api.requests(), requests);
    assert_eq!(h.session.store(), &before);
    assert!(h.notifications.try_recv().is_err());
}

#[tokio::test]
async fn test_move_without_target_column_fails_locally() {
    let mut h = Harness::with_api(MockBoardApi::with_columns(vec![
        Column::new(1, "To Do", 1),
        Column::new(2, "In Progress", 2),
    ]))
    .await;
    let id = h.add_task("Setup Project", TaskStatus::Todo, None).await;
    h.load().await;
    let requests = h.api.requests();

    let result = h.session.move_task(id, TaskStatus::Done).await;

    assert!(!result.success);
    assert!(result.error.unwrap().contains("\"Done\""));
    assert_eq!(h.api.requests(), requests);
    assert_eq!(h.session.task(id).unwrap().task.status, TaskStatus::Todo);
}

#[tokio::test]
async fn test_create_without_done_column_is_rejected() {
    let mut h = Harness::with_api(MockBoardApi::with_columns(vec![
        Column::new(1, "To Do", 1),
        Column::new(2, "In Progress", 2),
    ]))
    .await;
    h.load().await;

    let result = h
        .session
        .create_task(CreateTaskInput {
            title: "Deploy".to_string(),
            description: None,
            status: TaskStatus::Done,
            assignee_id: None,
        })
        .await;

    assert!(!result.success);
    assert_eq!(
        result.error.as_deref(),
        Some("No column named \"Done\" exists for status 'done'")
    );
    assert!(h.session.store().is_empty());
}

#[tokio::test]
async fn test_assign_then_unassign() {
    let mut h = Harness::new().await;
    let alex = h.add_user("Alex Johnson").await;
    let id = h.add_task("Setup Project", TaskStatus::Todo, None).await;
    h.load().await;

    assert!(h.session.set_assignee(id, Some(alex)).await.success);
    let details = h.session.task(id).unwrap();
    assert_eq!(details.task.assignee_id, Some(alex));
    assert_eq!(details.assignee.as_ref().unwrap().name, "Alex Johnson");
    assert_eq!(
        h.last_notification().description,
        "Task assigned to Alex Johnson"
    );

    assert!(h.session.set_assignee(id, None).await.success);
    let details = h.session.task(id).unwrap();
    assert_eq!(details.task.assignee_id, None);
    assert_eq!(details.assignee, None);
    assert_eq!(h.last_notification().description, "Task unassigned");
}

#[tokio::test]
async fn test_failed_unassign_restores_assignee() {
    let mut h = Harness::new().await;
    let owner = h.add_user("Sarah Williams").await;
    let id = h.add_task("Setup Database", TaskStatus::Done, Some(owner)).await;
    h.load().await;

    h.api.fail_next(ErrorBody::message("")).await;
    let result = h.session.set_assignee(id, None).await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Failed to assign task"));
    let details = h.session.task(id).unwrap();
    assert_eq!(details.task.assignee_id, Some(owner));
    assert_eq!(details.assignee.as_ref().unwrap().id, owner);
}

#[tokio::test]
async fn test_unknown_assignee_is_rolled_back() {
    let mut h = Harness::new().await;
    let id = h.add_task("Setup Project", TaskStatus::Todo, None).await;
    h.load().await;

    let result = h.session.set_assignee(id, Some(404)).await;

    assert!(!result.success);
    let fields = result.field_errors.unwrap();
    assert_eq!(fields["assigneeId"], "Assignee does not exist");
    assert_eq!(h.session.task(id).unwrap().task.assignee_id, None);
}

#[tokio::test]
async fn test_assigned_task_delete_is_blocked_locally() {
    let mut h = Harness::new().await;
    let owner = h.add_user("Michael Brown").await;
    let id = h.add_task("API Integration", TaskStatus::InProgress, Some(owner)).await;
    h.load().await;
    let requests = h.api.requests();

    let result = h.session.delete_task(id).await;

    assert!(!result.success);
    assert_eq!(
        result.error.as_deref(),
        Some("Cannot delete a task that is assigned to a user. Unassign it first.")
    );
    assert_eq!(h.api.requests(), requests);
    assert!(h.session.task(id).is_some());
}

#[tokio::test]
async fn test_delete_unassigned_task() {
    let mut h = Harness::new().await;
    let id = h.add_task("Testing", TaskStatus::Todo, None).await;
    h.load().await;

    let result = h.session.delete_task(id).await;

    assert!(result.success);
    assert!(h.session.task(id).is_none());
    assert_eq!(h.last_notification().title, "Task deleted");
    assert!(h.api.service().task(id).await.is_err());
}

#[tokio::test]
async fn test_failed_delete_restores_task() {
    let mut h = Harness::new().await;
    let id = h.add_task("Testing", TaskStatus::Todo, None).await;
    h.load().await;

    h.api.fail_next(ErrorBody::message("Timeout")).await;
    let result = h.session.delete_task(id).await;

    assert!(!result.success);
    assert!(h.session.task(id).is_some());
}

#[tokio::test]
async fn test_delete_user_with_task_is_refused() {
    let mut h = Harness::new().await;
    let owner = h.add_user("Emily Davis").await;
    h.add_task("Design UI", TaskStatus::InProgress, Some(owner)).await;
    h.load().await;

    let result = h.session.delete_user(owner).await;

    assert!(!result.success);
    assert_eq!(
        result.error.as_deref(),
        Some("Cannot delete this user as they have 1 task assigned.")
    );
    assert_eq!(result.has_assigned_tasks, Some(true));
    assert_eq!(result.task_count, Some(1));
    assert!(h.session.users().iter().any(|user| user.id == owner));
    assert!(h.api.service().user(owner).await.is_ok());
}

#[tokio::test]
async fn test_user_tasks_before_delete() {
    let mut h = Harness::new().await;
    let owner = h.add_user("David Wilson").await;
    h.add_task("Setup Database", TaskStatus::Done, Some(owner)).await;
    h.load().await;

    let tasks = h.session.user_tasks(owner).await.unwrap();
    assert_eq!(tasks.len(), 1);

    let free = h.add_user("Lisa Taylor").await;
    assert!(h.session.user_tasks(free).await.unwrap().is_empty());
    assert!(h.session.delete_user(free).await.success);
    assert!(h.session.users().iter().all(|user| user.id != free));
}

#[tokio::test]
async fn test_dialog_update_moves_and_renames() {
    let mut h = Harness::new().await;
    h.add_task("Already done", TaskStatus::Done, None).await;
    let id = h.add_task("Setup Project", TaskStatus::Todo, None).await;
    h.load().await;

    let result = h
        .session
        .update_task(
            id,
            UpdateTaskInput {
                title: "Setup Project v2".to_string(),
                description: Some("Initialize the repository".to_string()),
                status: TaskStatus::Done,
                assignee_id: None,
                version: None,
            },
        )
        .await;

    assert!(result.success);
    let task = &h.session.task(id).unwrap().task;
    assert_eq!(task.title, "Setup Project v2");
    assert_eq!(task.column_id, 3);
    assert_eq!(task.order, 1);
    h.assert_column_consistent();
    assert_eq!(h.last_notification().title, "Task updated");
}

#[tokio::test]
async fn test_dialog_validation_errors_roll_back() {
    let mut h = Harness::new().await;
    let id = h.add_task("Setup Project", TaskStatus::Todo, None).await;
    h.load().await;

    let result = h
        .session
        .update_task(
            id,
            UpdateTaskInput {
                title: String::new(),
                description: None,
                status: TaskStatus::Todo,
                assignee_id: None,
                version: None,
            },
        )
        .await;

    assert!(!result.success);
    assert!(result.field_errors.unwrap().contains_key("title"));
    assert_eq!(h.session.task(id).unwrap().task.title, "Setup Project");
}

#[tokio::test]
async fn test_create_task_appends_to_store() {
    let mut h = Harness::new().await;
    h.load().await;

    let result = h
        .session
        .create_task(CreateTaskInput {
            title: "Write tests".to_string(),
            description: None,
            status: TaskStatus::Todo,
            assignee_id: None,
        })
        .await;

    assert!(result.success);
    let tasks = h.session.store().grouped(TaskStatus::Todo);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].task.title, "Write tests");
    assert_eq!(
        h.last_notification().description,
        "Your task has been created successfully."
    );
}

#[tokio::test]
async fn test_user_rename_refreshes_assignees() {
    let mut h = Harness::new().await;
    let owner = h.add_user("Chris Martin").await;
    let id = h.add_task("Testing", TaskStatus::Todo, Some(owner)).await;
    h.load().await;

    let result = h
        .session
        .update_user(
            owner,
            taskboard_shared::models::user::UpdateUser {
                name: "Chris Martinez".to_string(),
                email: "chris.martin@example.com".to_string(),
                role: Some("Product Manager".to_string()),
                avatar: None,
            },
        )
        .await;

    assert!(result.success);
    let assignee = h.session.task(id).unwrap().assignee.clone().unwrap();
    assert_eq!(assignee.name, "Chris Martinez");
    assert_eq!(h.last_notification().title, "User updated");
}

#[tokio::test]
async fn test_duplicate_email_reports_field() {
    let mut h = Harness::new().await;
    h.add_user("Jessica Lee").await;
    h.load().await;

    let result = h
        .session
        .create_user(CreateUser {
            name: "Jess Lee".to_string(),
            email: "jessica.lee@example.com".to_string(),
            role: None,
            avatar: None,
        })
        .await;

    assert!(!result.success);
    assert!(result.field_errors.unwrap().contains_key("email"));
    assert_eq!(h.session.users().len(), 1);
}

#[tokio::test]
async fn test_external_updates() {
    let mut h = Harness::new().await;
    let id = h.add_task("Setup Project", TaskStatus::Todo, None).await;
    h.load().await;

    let remote = h.api.service().task(id).await.unwrap();
    let mut renamed = remote.clone();
    renamed.task.title = "Renamed elsewhere".to_string();
    h.session.upsert_from_server(renamed);
    assert_eq!(h.session.task(id).unwrap().task.title, "Renamed elsewhere");

    h.session.apply_update(TaskUpdate::Deleted { id });
    assert!(h.session.task(id).is_none());

    h.session.apply_update(TaskUpdate::Upsert(remote));
    h.session.remove_locally(id);
    assert!(h.session.store().is_empty());
}
