//! Operator HTTP endpoint: Prometheus metrics and read-only stats.
//!
//! Runs on a separate tokio task. Routes:
//! - `GET /metrics` - Prometheus text format
//! - `GET /stats` - registry-wide stats as JSON
//! - `GET /stats/:room` - one room's stats as JSON

use crate::service::ChatService;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing::get};
use std::net::SocketAddr;
use std::sync::Arc;

/// Handler for GET /metrics - returns Prometheus metrics in text format.
async fn metrics_handler() -> String {
    crate::metrics::gather_metrics()
}

async fn global_stats_handler(State(service): State<Arc<ChatService>>) -> Response {
    match service.global_stats().await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

async fn room_stats_handler(
    State(service): State<Arc<ChatService>>,
    Path(room): Path<String>,
) -> Response {
    match service.room_stats(&room).await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// Build the operator router.
pub fn router(service: Arc<ChatService>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/stats", get(global_stats_handler))
        .route("/stats/:room", get(room_stats_handler))
        .with_state(service)
}

/// Run the operator HTTP server.
///
/// Binds to `0.0.0.0:port`. This is a long-running task that should be
/// spawned in the background.
pub async fn run_http_server(port: u16, service: Arc<ChatService>) {
    let app = router(service);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "operator HTTP server listening");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "Failed to bind HTTP server");
            return;
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "HTTP server error");
    }
}
