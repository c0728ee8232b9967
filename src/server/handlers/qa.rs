use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use axum::Json;

use crate::core::errors::ApiError;
use crate::rag::{RetrievalQa, MISSING_QUESTION_WARNING};
use crate::server::handlers::upload::UploadForm;
use crate::state::AppState;

/// One-shot question over an uploaded document; nothing is kept afterwards.
pub async fn ask_document(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = UploadForm::read(multipart).await?;
    let question = form.field("question").to_string();
    if question.trim().is_empty() {
        return Err(ApiError::warning(MISSING_QUESTION_WARNING));
    }
    let upload = form.into_file()?;

    let rag = &state.settings.rag;
    let qa = RetrievalQa::new(&state.llm, &state.llm, rag.top_k);
    let answer = qa
        .answer_document(&upload.file_name, upload.bytes, &question, rag.embed_batch_size)
        .await?;

    tracing::info!(
        "Answered question on {} from {} sources",
        upload.file_name,
        answer.sources.len()
    );
    Ok(Json(answer))
}
