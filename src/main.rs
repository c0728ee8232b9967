use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;

use edumind_backend::core::config::AppPaths;
use edumind_backend::core::logging;
use edumind_backend::server;
use edumind_backend::state::AppState;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let paths = Arc::new(AppPaths::new());
    logging::init(&paths);

    let state = AppState::initialize(paths).context("Failed to initialize application state")?;

    let server_settings = &state.settings.server;
    let port = env::var("PORT")
        .ok()
        .and_then(|val| val.parse::<u16>().ok())
        .unwrap_or(server_settings.port);
    let bind_addr = format!("{}:{}", server_settings.host, port);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;
    tracing::info!("Listening on {}", addr);

    if !state.llm.health_check().await {
        tracing::warn!(
            "LLM backend {} at {} is not reachable yet; requests will fail until it is",
            state.llm.provider_name(),
            state.settings.llm.base_url
        );
    }

    let sweeper = state.sessions.spawn_sweeper(SESSION_SWEEP_INTERVAL);

    let app = server::router(state.clone());
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    sweeper.abort();

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("Ctrl+C received, shutting down gracefully");
}
