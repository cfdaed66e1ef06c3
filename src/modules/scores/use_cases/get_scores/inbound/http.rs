use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::shell::http::error_response;
use crate::shell::state::AppState;

pub async fn handle(State(state): State<AppState>) -> impl IntoResponse {
    match state.scores.all().await {
        Ok(table) => Json(table).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to read scores");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}

pub async fn handle_item(
    State(state): State<AppState>,
    Path(item): Path<String>,
) -> impl IntoResponse {
    match state.scores.item(&item).await {
        Ok(Some(breakdown)) => Json(breakdown).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, format!("no votes for {item}")),
        Err(e) => {
            tracing::error!(error = %e, item = %item, "failed to read scores");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}
