use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::document::{extract_uploaded, SplitterConfig, TextSplitter};
use crate::llm::TextGenerator;
use crate::prompts::{build_document_prompt, build_material_prompt, MaterialKind};
use crate::server::handlers::upload::UploadForm;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateMaterialRequest {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub grade_level: String,
    pub kind: MaterialKind,
}

#[derive(Debug, Deserialize)]
pub struct MaterialFromTextRequest {
    #[serde(default)]
    pub text: String,
    pub kind: MaterialKind,
}

pub async fn generate_material(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GenerateMaterialRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let template = state.templates.get(payload.kind);
    let prompt = build_material_prompt(template, &payload.topic, &payload.grade_level)?;

    tracing::info!(
        "Generating {} for {:?} ({})",
        payload.kind.label(),
        payload.topic,
        payload.grade_level
    );
    let content = state.llm.generate(&prompt).await?;

    Ok(Json(json!({
        "kind": payload.kind,
        "prompt_chars": prompt.chars().count(),
        "content": content
    })))
}

/// Extracts and chunks an uploaded PDF so the text can be reviewed before
/// generating from it.
pub async fn extract_material(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let upload = UploadForm::read(multipart).await?.into_file()?;
    let document = extract_uploaded(upload.file_name, upload.bytes).await?;

    let pages = document.page_count();
    let splitter = TextSplitter::new(SplitterConfig::from(&state.settings.rag));
    let chunks = splitter.split_fragments(&document.fragments);
    let text = chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    Ok(Json(json!({
        "file_name": document.file_name,
        "pages": pages,
        "chunks": chunks.len(),
        "text": text,
        "error": document.error
    })))
}

pub async fn generate_from_text(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<MaterialFromTextRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let prompt = build_document_prompt(payload.kind, &payload.text)?;

    tracing::info!(
        "Generating {} from {} chars of material",
        payload.kind.label(),
        payload.text.chars().count()
    );
    let content = state.llm.generate(&prompt).await?;

    Ok(Json(json!({
        "kind": payload.kind,
        "prompt_chars": prompt.chars().count(),
        "content": content
    })))
}
