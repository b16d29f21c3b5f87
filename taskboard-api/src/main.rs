//! # Taskboard API Server
//!
//! Serves the kanban board over JSON HTTP.
//!
//! With `DATABASE_URL` set the board is stored in PostgreSQL (migrations run
//! at startup). Without it the server keeps the board in memory, which is
//! handy for demos and front-end work.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/taskboard cargo run -p taskboard-api
//! SEED_DEMO_DATA=true cargo run -p taskboard-api
//! ```

use anyhow::Context;
use std::sync::Arc;
use taskboard_api::{
    app::{build_router, AppState},
    config::Config,
    telemetry::{init_tracing, LogFormat},
};
use taskboard_shared::{
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    repository::{BoardRepository, InMemoryBoardRepository, PgBoardRepository},
    seed::{ensure_default_columns, seed_demo_board},
    service::BoardService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(LogFormat::from_env());

    tracing::info!(
        "Taskboard API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env().context("Failed to load configuration")?;

    let (repo, pool): (Arc<dyn BoardRepository>, _) = match &config.database {
        Some(database) => {
            let pool = create_pool(DatabaseConfig {
                url: database.url.clone(),
                max_connections: database.max_connections,
                ..Default::default()
            })
            .await
            .context("Failed to connect to database")?;
            run_migrations(&pool)
                .await
                .context("Failed to run migrations")?;
            (Arc::new(PgBoardRepository::new(pool.clone())), Some(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, board data is kept in memory only");
            (Arc::new(InMemoryBoardRepository::new()), None)
        }
    };

    let columns = ensure_default_columns(repo.as_ref())
        .await
        .context("Failed to create status columns")?;
    tracing::info!(columns = columns.len(), backend = repo.name(), "Board ready");

    let board = BoardService::new(repo);
    if config.seed_demo_data {
        seed_demo_board(&board)
            .await
            .context("Failed to seed demo data")?;
    }

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(board, config));

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = pool {
        close_pool(pool).await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
