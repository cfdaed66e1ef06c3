use axum::{
    Json, extract::State, extract::rejection::JsonRejection, http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tokio::time::Instant;

use crate::modules::scores::core::vote::{Vote, VoteBatch};
use crate::modules::scores::use_cases::submit_votes::coordinator::SubmitVotesError;
use crate::shell::http::error_response;
use crate::shell::state::AppState;

#[derive(Deserialize)]
pub struct SubmitVotesBody {
    #[serde(default)]
    pub votes: Vec<Vote>,
}

pub async fn handle(
    State(state): State<AppState>,
    body: Result<Json<SubmitVotesBody>, JsonRejection>,
) -> impl IntoResponse {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };
    let batch = match VoteBatch::new(body.votes) {
        Ok(batch) => batch,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };

    let deadline = state.request_deadline.map(|d| Instant::now() + d);
    match state.coordinator.handle(&batch, deadline).await {
        Ok(table) => Json(table).into_response(),
        Err(e @ SubmitVotesError::ContentionExhausted { .. }) => {
            error_response(StatusCode::CONFLICT, e)
        }
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}
