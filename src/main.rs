// src/main.rs

use std::sync::Arc;
use std::time::Duration;

use dotenvy::dotenv;
use study_planner::config::Config;
use study_planner::llm::GeminiProvider;
use study_planner::repository::PgRepository;
use study_planner::routes;
use study_planner::state::AppState;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file (if present)
    dotenv().ok();

    let config = Config::from_env()?;

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Connect with retry; hosted databases are often still waking up.
    let mut retry_count = 0;
    let repo = loop {
        match PgRepository::connect(&config).await {
            Ok(repo) => break repo,
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    tracing::error!("Failed to connect to database after 5 retries: {}", e);
                    return Err(e.into());
                }
                tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    };
    tracing::info!("Database connected...");

    tracing::info!("Running migrations...");
    repo.migrate().await?;
    tracing::info!("Migrations applied successfully.");

    let llm = GeminiProvider::new(&config.llm)?;
    let bind_addr = config.bind_addr;
    let state = AppState::new(Arc::new(repo), Arc::new(llm), config);

    let app = routes::create_router(state);

    tracing::info!("Listening on {}", bind_addr);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;

    axum::serve(listener, app).await?;
    Ok(())
}
