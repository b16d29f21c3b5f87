/// Default columns and demo data
///
/// The three status columns are a precondition of the board and are created
/// at startup. Demo data is optional and only written into an empty board.

use crate::error::BoardResult;
use crate::models::column::{Column, CreateColumn};
use crate::models::task::CreateTaskInput;
use crate::models::user::CreateUser;
use crate::repository::BoardRepository;
use crate::service::BoardService;
use crate::status::TaskStatus;
use tracing::{debug, info};

const DEMO_USERS: [(&str, &str, &str); 8] = [
    ("Alex Johnson", "Frontend Developer", "https://randomuser.me/api/portraits/men/32.jpg"),
    ("Taylor Smith", "UI/UX Designer", "https://randomuser.me/api/portraits/women/44.jpg"),
    ("Jordan Lee", "Backend Developer", "https://randomuser.me/api/portraits/men/46.jpg"),
    ("Morgan Chen", "Product Manager", "https://randomuser.me/api/portraits/women/33.jpg"),
    ("Riley Brown", "DevOps Engineer", "https://randomuser.me/api/portraits/men/97.jpg"),
    ("Jamie Garcia", "QA Engineer", "https://randomuser.me/api/portraits/women/68.jpg"),
    ("Casey Wilson", "Data Scientist", "https://randomuser.me/api/portraits/men/2.jpg"),
    ("Quinn Murphy", "Technical Writer", "https://randomuser.me/api/portraits/women/90.jpg"),
];

// (title, description, status, index into DEMO_USERS)
const DEMO_TASKS: [(&str, &str, TaskStatus, Option<usize>); 5] = [
    ("Design Homepage", "Create wireframes and mockups for the new homepage", TaskStatus::Todo, Some(0)),
    ("Implement Auth", "Set up user authentication flow", TaskStatus::InProgress, Some(1)),
    ("Setup Database", "Configure the database schema and connections", TaskStatus::Done, None),
    ("API Documentation", "Document all API endpoints", TaskStatus::Todo, Some(2)),
    ("Unit Testing", "Write unit tests for core functionality", TaskStatus::InProgress, None),
];

/// The three status columns with ids 1..=3
pub fn default_columns() -> Vec<Column> {
    TaskStatus::ALL
        .into_iter()
        .zip(1..)
        .map(|(status, position)| Column::new(position, status.label(), position))
        .collect()
}

/// Creates whichever status columns are missing
///
/// Existing columns are matched by name and left alone, so this is safe to
/// run on every boot.
pub async fn ensure_default_columns(repo: &dyn BoardRepository) -> BoardResult<Vec<Column>> {
    let existing = repo.list_columns().await?;

    for (status, order) in TaskStatus::ALL.into_iter().zip(1..) {
        if existing.iter().any(|column| column.name == status.label()) {
            continue;
        }

        let column = repo
            .create_column(CreateColumn {
                name: status.label().to_string(),
                order,
            })
            .await?;
        info!(column_id = column.id, name = %column.name, "Created status column");
    }

    repo.list_columns().await
}

/// What [`seed_demo_board`] wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub tasks: usize,
}

/// Fills an empty board with demo team members and tasks
///
/// Does nothing when any user already exists.
pub async fn seed_demo_board(service: &BoardService) -> BoardResult<SeedReport> {
    if service.user_count().await? > 0 {
        debug!("Board already has users, skipping demo data");
        return Ok(SeedReport::default());
    }

    let mut user_ids = Vec::with_capacity(DEMO_USERS.len());
    for (name, role, avatar) in DEMO_USERS {
        let user = service
            .create_user(CreateUser {
                name: name.to_string(),
                email: demo_email(name),
                role: Some(role.to_string()),
                avatar: Some(avatar.to_string()),
            })
            .await?;
        user_ids.push(user.id);
    }

    for (title, description, status, assignee) in DEMO_TASKS {
        service
            .create_task(CreateTaskInput {
                title: title.to_string(),
                description: Some(description.to_string()),
                status,
                assignee_id: assignee.and_then(|index| user_ids.get(index).copied()),
            })
            .await?;
    }

    let report = SeedReport {
        users: DEMO_USERS.len(),
        tasks: DEMO_TASKS.len(),
    };
    info!(users = report.users, tasks = report.tasks, "Seeded demo board");
    Ok(report)
}

fn demo_email(name: &str) -> String {
    format!("{}@example.com", name.to_lowercase().replace(' ', "."))
}
