use std::sync::Arc;
use anyhow::{Context, Result};
use axum::Router;
use tracing::info;
use crate::app::App;
use crate::observability::metrics::{get_metrics, Metrics};
use crate::observability::routes::MetricsState;
use crate::server::routes;

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
    pub app: Arc<App>,
}

impl AppState {
    pub fn new(metrics: &Metrics, app: Arc<App>) -> Self {
        Self {
            metrics_state: MetricsState::new(metrics.registry.clone()),
            app,
        }
    }
}

pub async fn router(app: Arc<App>) -> Router {
    let metrics = get_metrics().await;
    let state = AppState::new(metrics, app.clone());

    Router::new()
        .merge(state.metrics_state.router(&app.config.settings.metrics))
        .merge(routes::router())
        .with_state(state)
}

/// Serve the HTTP surface until Ctrl-C.
pub async fn start(app: Arc<App>) -> Result<()> {
    let server = &app.config.settings.server;
    let bind = format!("{}:{}", server.host, server.port);
    let router = router(app.clone()).await;

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("binding {}", bind))?;
    info!("listening on {}", bind);
    get_metrics().await.up.set(1);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await
        .context("http server failed")?;

    get_metrics().await.up.set(0);
    Ok(())
}
