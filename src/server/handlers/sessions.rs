use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::core::errors::ApiError;
use crate::document::extract_uploaded;
use crate::rag::{DocumentIndex, RetrievalQa, EMPTY_DOCUMENT_WARNING, MISSING_QUESTION_WARNING};
use crate::server::handlers::upload::UploadForm;
use crate::session::TRANSCRIPT_FILE_NAME;
use crate::state::AppState;

pub const NO_DOCUMENT_WARNING: &str = "Please upload a document first.";

#[derive(Debug, Deserialize)]
pub struct AskQuestionRequest {
    #[serde(default)]
    pub question: String,
}

pub async fn create_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session = state.sessions.create().await;
    (StatusCode::CREATED, Json(json!({ "session": session })))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.sessions.info(session_id).await?;
    Ok(Json(json!({ "session": session })))
}

pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.sessions.remove(session_id).await?;
    Ok(Json(json!({ "status": "deleted" })))
}

/// Extracts and indexes an uploaded document, replacing any earlier one.
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    state.sessions.info(session_id).await?;
    let upload = UploadForm::read(multipart).await?.into_file()?;

    let document = extract_uploaded(upload.file_name, upload.bytes).await?;
    if document.is_empty() {
        let message = match &document.error {
            Some(err) => format!("{} ({})", EMPTY_DOCUMENT_WARNING, err),
            None => EMPTY_DOCUMENT_WARNING.to_string(),
        };
        return Err(ApiError::warning(message));
    }

    let index = DocumentIndex::build(
        &document.file_name,
        document.fragments,
        &state.llm,
        state.settings.rag.embed_batch_size,
    )
    .await?;
    let session = state.sessions.set_document(session_id, index).await?;

    let summary = session
        .document
        .ok_or_else(|| ApiError::internal("document missing after indexing"))?;
    tracing::info!(
        "Session {} indexed {} ({} fragments)",
        session_id,
        summary.file_name,
        summary.fragments
    );
    Ok(Json(json!({
        "file_name": summary.file_name,
        "fragments": summary.fragments
    })))
}

pub async fn ask_question(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<AskQuestionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let index = state.sessions.document(session_id).await?;
    if payload.question.trim().is_empty() {
        return Err(ApiError::warning(MISSING_QUESTION_WARNING));
    }
    let index = index.ok_or_else(|| ApiError::warning(NO_DOCUMENT_WARNING))?;

    let qa = RetrievalQa::new(&state.llm, &state.llm, state.settings.rag.top_k);
    let answer = qa.ask(&index, &payload.question).await?;

    let number = state
        .sessions
        .append(session_id, &answer.question, &answer.answer)
        .await?;
    tracing::info!(
        "Session {} answered question {} from {} sources",
        session_id,
        number,
        answer.sources.len()
    );
    Ok(Json(answer))
}

pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let history = state.sessions.history(session_id).await?;
    Ok(Json(json!({ "history": history })))
}

pub async fn clear_history(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let cleared = state.sessions.clear_history(session_id).await?;
    Ok(Json(json!({ "cleared": cleared })))
}

pub async fn download_history(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let transcript = state.sessions.transcript(session_id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", TRANSCRIPT_FILE_NAME),
            ),
        ],
        transcript,
    ))
}
