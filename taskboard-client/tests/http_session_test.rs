/// Board session over real HTTP
///
/// Serves the API router on an ephemeral local port and drives a session
/// through `HttpBoardApi`, so responses and error bodies cross the wire as
/// JSON exactly as they do in production.

use std::sync::Arc;
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::Config;
use taskboard_client::api::HttpBoardApi;
use taskboard_client::notify::{Notification, Notifier};
use taskboard_client::session::BoardSession;
use taskboard_shared::models::task::{CreateTaskInput, MoveTaskInput};
use taskboard_shared::models::user::CreateUser;
use taskboard_shared::repository::InMemoryBoardRepository;
use taskboard_shared::seed::default_columns;
use taskboard_shared::service::BoardService;
use taskboard_shared::status::TaskStatus;
use tokio::net::TcpListener;
use tokio::sync::mpsc::UnboundedReceiver;

struct Server {
    board: BoardService,
    session: BoardSession,
    _notifications: UnboundedReceiver<Notification>,
}

impl Server {
    async fn start() -> Self {
        let repo = InMemoryBoardRepository::with_columns(default_columns());
        let board = BoardService::new(Arc::new(repo));
        let app = build_router(AppState::new(board.clone(), Config::for_tests()));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let api = HttpBoardApi::new(&format!("http://{}", addr)).unwrap();
        let (notifier, notifications) = Notifier::channel();
        Server {
            board,
            session: BoardSession::new(Arc::new(api), notifier),
            _notifications: notifications,
        }
    }

    async fn add_user(&self, name: &str) -> i32 {
        self.board
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

    async fn add_task(&self, title: &str, status: TaskStatus, assignee_id: Option<i32>) -> i32 {
        self.board
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

    async fn load(&mut self) {
        assert!(self.session.load().await.success);
    }
}

#[tokio::test]
async fn test_move_lands_at_end_of_target_column() {
    let mut server = Server::start().await;
    server.add_task("Implement Auth", TaskStatus::InProgress, None).await;
    let id = server.add_task("Design Homepage", TaskStatus::Todo, None).await;
    server.load().await;

    let result = server.session.move_task(id, TaskStatus::InProgress).await;

    assert!(result.success, "{:?}", result.error);
    let moved = server.session.task(id).unwrap();
    assert_eq!(moved.task.status, TaskStatus::InProgress);
    assert_eq!(moved.task.column_id, 2);
    assert_eq!(moved.task.order, 1);
    assert_eq!(moved.task.version, 2);

    let stored = server.board.task(id).await.unwrap();
    assert_eq!(stored.task.version, moved.task.version);
    assert_eq!(stored.task.column_id, moved.task.column_id);
}

#[tokio::test]
async fn test_unassign_clears_assignee_and_profile() {
    let mut server = Server::start().await;
    let alex = server.add_user("Alex Johnson").await;
    let id = server.add_task("API Documentation", TaskStatus::Todo, Some(alex)).await;
    server.load().await;
    assert_eq!(
        server.session.task(id).unwrap().assignee.as_ref().map(|user| user.id),
        Some(alex)
    );

    let result = server.session.set_assignee(id, None).await;

    assert!(result.success, "{:?}", result.error);
    let details = server.session.task(id).unwrap();
    assert_eq!(details.task.assignee_id, None);
    assert!(details.assignee.is_none());
    assert_eq!(server.board.task(id).await.unwrap().task.assignee_id, None);
}

#[tokio::test]
async fn test_delete_user_with_assigned_task_is_refused() {
    let mut server = Server::start().await;
    let emily = server.add_user("Emily Davis").await;
    server.add_task("Design UI", TaskStatus::InProgress, Some(emily)).await;
    server.load().await;

    let result = server.session.delete_user(emily).await;

    assert!(!result.success);
    assert_eq!(
        result.error.as_deref(),
        Some("Cannot delete this user as they have 1 task assigned.")
    );
    assert_eq!(result.has_assigned_tasks, Some(true));
    assert_eq!(result.task_count, Some(1));
    assert!(server.session.users().iter().any(|user| user.id == emily));
    assert!(server.board.user(emily).await.is_ok());
}

#[tokio::test]
async fn test_stale_move_is_rejected_and_rolled_back() {
    let mut server = Server::start().await;
    let id = server.add_task("Unit Testing", TaskStatus::Todo, None).await;
    server.load().await;

    // Someone else moves the task after this session loaded it
    server
        .board
        .move_task(
            id,
            MoveTaskInput {
                status: TaskStatus::Done,
                version: None,
            },
        )
        .await
        .unwrap();

    let result = server.session.move_task(id, TaskStatus::InProgress).await;

    assert!(!result.success);
    assert!(result
        .error
        .as_deref()
        .unwrap()
        .contains("was changed by someone else"));
    assert_eq!(server.session.task(id).unwrap().task.status, TaskStatus::Todo);
    assert_eq!(server.board.task(id).await.unwrap().task.status, TaskStatus::Done);
}

#[tokio::test]
async fn test_duplicate_email_returns_field_error() {
    let mut server = Server::start().await;
    server.add_user("Jordan Lee").await;
    server.load().await;

    let result = server
        .session
        .create_user(CreateUser {
            name: "Jordan Again".to_string(),
            email: "jordan.lee@example.com".to_string(),
            role: None,
            avatar: None,
        })
        .await;

    assert!(!result.success);
    let fields = result.field_errors.unwrap();
    assert_eq!(fields["email"], "This email is already in use");
    assert_eq!(server.board.users().await.unwrap().len(), 1);
}
