// src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use scrapflow::{build_router, config::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("scrapflow=info,tower_http=info")),
        )
        .with_target(false)
        .compact()
        .init();

    let app_state = AppState::new().await?;

    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("Database migrations applied");

    let bind_addr = app_state.config.bind_addr.clone();
    let app = build_router(app_state)?;

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
