mod auth;
mod db;
mod error;
mod middleware;
mod routes;
mod state;
mod task;
mod user;

use anyhow::Context;
use db::{create_pool, run_migrations};
use routes::create_router;
use state::{AppState, Config};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,task_tracker=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env()?);

    tracing::info!("Connecting to database...");
    let db = create_pool(&config.database_url, config.database_max_connections)
        .await
        .context("failed to connect to the database")?;

    tracing::info!("Running migrations...");
    run_migrations(&db).await.context("failed to run migrations")?;

    // Create repositories
    let user_repository = user::UserRepository::new(db.clone());
    let task_repository = task::TaskRepository::new(db.clone());

    // Create services
    let task_service = task::TaskService::new(Arc::new(task_repository));
    let auth_service = auth::AuthService::new(
        user_repository,
        config.jwt_secret.clone(),
        config.jwt_expires_in_days,
    );

    let state = AppState {
        config: config.clone(),
        task_service,
        auth_service,
    };

    let app = create_router(state);

    let addr = config.bind_address();
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
