use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use hagg::hagg_auth::CasbinEnforcer;
use hagg::hagg_config::AppConfig;
use hagg::router::init_router;
use hagg::state::init_app_state;
use hagg::{logging, metrics};
use tracing::{error, info};

const LOG_DIR: &str = "storage/logs";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = AppConfig::from_env().context("invalid configuration")?;
    logging::init_tracing(LOG_DIR)?;
    let metrics_handle = metrics::init_metrics()?;

    let (state, engine) = init_app_state(&config).await?;
    spawn_policy_reloader(engine);

    let mut app = init_router(state);
    if let Some(handle) = metrics_handle {
        app = app.merge(metrics::metrics_app(handle));
    }

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, base_path = %config.server.base_path, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    logging::shutdown_tracer();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutting down");
}

/// Reloads the policy file on every `SIGHUP`.
#[cfg(unix)]
fn spawn_policy_reloader(engine: Arc<CasbinEnforcer>) {
    use tokio::signal::unix::{SignalKind, signal};

    tokio::spawn(async move {
        let mut hangups = match signal(SignalKind::hangup()) {
            Ok(hangups) => hangups,
            Err(e) => {
                error!(error = %e, "Cannot listen for SIGHUP, policy reload disabled");
                return;
            }
        };

        while hangups.recv().await.is_some() {
            info!("SIGHUP received, reloading policy");
            if let Err(e) = engine.reload().await {
                error!(error = %e, "Policy reload failed");
            }
        }
    });
}

#[cfg(not(unix))]
fn spawn_policy_reloader(_engine: Arc<CasbinEnforcer>) {}
