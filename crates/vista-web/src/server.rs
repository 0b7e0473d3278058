use crate::routes::{config_routes, health_routes, widget_routes};
use crate::state::AppState;
use crate::{Result, WebError};
use axum::http::{header, Method};
use axum::Router;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};

/// Normalize a configured mount point: `""` or `"/"` mean the root,
/// otherwise a leading slash is ensured and a trailing one removed
pub fn normalize_prefix(prefix: &str) -> String {
    let prefix = prefix.trim();
    if prefix.is_empty() || prefix == "/" {
        return String::new();
    }

    let prefix = prefix.trim_end_matches('/');
    if prefix.starts_with('/') {
        prefix.to_string()
    } else {
        format!("/{}", prefix)
    }
}

/// API routes mounted under the configured prefix, health at the root
pub fn build_router(state: AppState) -> Router {
    let prefix = normalize_prefix(&state.config.path_prefix);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let api = Router::new()
        .merge(config_routes())
        .merge(widget_routes())
        .with_state(state);

    let app = if prefix.is_empty() {
        api
    } else {
        Router::new().nest(&prefix, api)
    };

    app.merge(health_routes()).layer(cors)
}

pub async fn start_server(state: AppState, addr: SocketAddr) -> Result<()> {
    let prefix = normalize_prefix(&state.config.path_prefix);
    let app = build_router(state);

    tracing::info!("Starting web server on http://{}{}", addr, prefix);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(WebError::Io)?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(WebError::Io)?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down web server");
}
