//src/main.rs

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use pos_admin::{
    config::{AppState, Config},
    routes::build_router,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env().context("failed to load configuration")?;

    let (app_state, db_pool) = AppState::connect(&config)
        .await
        .context("failed to initialize application state")?;

    sqlx::migrate!()
        .run(&db_pool)
        .await
        .context("failed to run database migrations")?;
    tracing::info!("✅ Database migrations applied");

    if let Some(bootstrap) = &config.bootstrap {
        app_state
            .tenant_service
            .bootstrap(bootstrap)
            .await
            .context("failed to bootstrap the superadmin")?;
    }

    let app = build_router(app_state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!("🚀 Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
