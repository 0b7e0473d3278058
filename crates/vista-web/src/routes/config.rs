use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use vista_config::AppConfig;

pub fn config_routes() -> Router<AppState> {
    Router::new().route("/api/config", get(get_config))
}

/// Pages, menu and widget layout; providers and queries are never serialized
async fn get_config(State(state): State<AppState>) -> Json<AppConfig> {
    Json(state.config.as_ref().clone())
}
