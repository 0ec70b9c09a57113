// src/bin/api_server.rs

use anyhow::Context;
use teacher_reviews::infra::telemetry;
use teacher_reviews::transport::http::{build_app, AppState};
use teacher_reviews::{Config, ReviewService, Store};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    telemetry::init_tracing()?;
    telemetry::install_panic_hook();

    let config = Config::from_env()?;

    // --- Store Initialization ---
    let store = Store::connect(&config.database_url)
        .await
        .with_context(|| format!("failed to open database at {}", config.database_url))?;
    store.init_schema().await?;

    // --- API Server Initialization ---
    let app = build_app(AppState::new(ReviewService::new(store.clone())), &config.static_dir);
    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr()))?;

    info!(addr = %config.bind_addr(), "server started");
    info!("API routes:");
    info!("  GET  /api/teachers");
    info!("  POST /api/teachers");
    info!("  POST /api/teachers/:id/reviews");
    info!("  GET  /api/test");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    store.close().await;
    info!("graceful shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
