use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::core::errors::ApiError;
use crate::evaluation::evaluate_answers;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    #[serde(default)]
    pub answers: String,
}

pub async fn evaluate(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EvaluateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let evaluation = evaluate_answers(&payload.answers, &state.llm).await?;
    Ok(Json(evaluation))
}
