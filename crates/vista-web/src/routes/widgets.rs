use crate::state::AppState;
use crate::WebError;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::debug;
use vista_query::{parse_query_pairs, DataResponse};

pub fn widget_routes() -> Router<AppState> {
    Router::new().route("/api/widgets/{id}", get(get_widget_data))
}

/// One page of widget data.
///
/// Query pairs are kept in order: repeated keys accumulate filter values.
async fn get_widget_data(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<DataResponse>, WebError> {
    let widget = state
        .config
        .find_widget(&id)
        .ok_or_else(|| WebError::NotFound(format!("widget '{}' not found", id)))?;

    let provider = state
        .providers
        .get(&widget.provider.name)
        .ok_or_else(|| WebError::BadRequest("unknown provider".to_string()))?;

    let request = parse_query_pairs(pairs);
    debug!(
        widget = %id,
        limit = request.limit,
        filters = request.filters.len(),
        "Fetching widget data"
    );

    let response = provider.fetch(widget, &request).await?;
    Ok(Json(response))
}
