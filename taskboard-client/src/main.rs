//! # Taskboard Client
//!
//! Loads the board from a running server and prints it column by column.
//!
//! ## Usage
//!
//! ```bash
//! TASKBOARD_API_URL=http://localhost:8080 cargo run -p taskboard-client
//! ```

use anyhow::Context;
use std::sync::Arc;
use taskboard_client::api::HttpBoardApi;
use taskboard_client::notify::Notifier;
use taskboard_client::session::BoardSession;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_API_URL: &str = "http://localhost:8080";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_url =
        std::env::var("TASKBOARD_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    let api = HttpBoardApi::new(&base_url).context("Invalid TASKBOARD_API_URL")?;

    let (notifier, mut notifications) = Notifier::channel();
    let mut session = BoardSession::new(Arc::new(api), notifier);

    let loaded = session.load().await;
    if !loaded.success {
        let reason = loaded.error.unwrap_or_default();
        anyhow::bail!("Could not load board from {}: {}", base_url, reason);
    }

    let mut columns = session.columns().to_vec();
    columns.sort_by_key(|column| column.order);
    let board = session.store().board();

    for column in &columns {
        println!("{}", column.name);
        let tasks = taskboard_shared::status::TaskStatus::from_column_name(&column.name)
            .and_then(|status| board.get(&status));
        for details in tasks.into_iter().flatten() {
            let assignee = details
                .assignee
                .as_ref()
                .map(|user| user.name.as_str())
                .unwrap_or("unassigned");
            println!("  #{:<4} {} ({})", details.task.id, details.task.title, assignee);
        }
    }
    println!("{} team members", session.users().len());

    while let Ok(notification) = notifications.try_recv() {
        tracing::info!(title = %notification.title, "{}", notification.description);
    }

    Ok(())
}
