use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

pub async fn health(State(_state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let backend_reachable = state.llm.health_check().await;
    let models: Vec<String> = if backend_reachable {
        match state.llm.list_models().await {
            Ok(models) => models.into_iter().map(|m| m.id).collect(),
            Err(err) => {
                tracing::warn!("Failed to list models: {}", err);
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };
    let llm = &state.settings.llm;
    Ok(Json(json!({
        "backend": {
            "provider": state.llm.provider_name(),
            "base_url": llm.base_url,
            "model": llm.model,
            "embedding_model": llm.embedding_model,
            "reachable": backend_reachable,
            "models": models
        },
        "templates": {
            "lesson_plan": state.templates.lesson_plan.is_loaded(),
            "worksheet": state.templates.worksheet.is_loaded()
        },
        "sessions": state.sessions.count().await,
        "uptime_secs": (Utc::now() - state.started_at).num_seconds()
    })))
}
