//! PDF text extraction.
//!
//! Pages are extracted in document order; each page with any
//! non-whitespace text becomes one [`Fragment`].

use std::path::Path;

use lopdf::Document;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::upload::TempUpload;
use crate::core::errors::ApiError;

/// A contiguous slice of extracted document text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub text: String,
    /// 1-based page number the text came from.
    pub page: u32,
    /// Position within the fragment sequence.
    pub index: usize,
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to buffer upload: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse PDF: {0}")]
    Pdf(String),
}

/// Result of extracting an uploaded file. Never fails as a whole: a
/// document that cannot be parsed comes back empty with `error` set.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedDocument {
    pub file_name: String,
    pub fragments: Vec<Fragment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractedDocument {
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn full_text(&self) -> String {
        self.fragments
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn page_count(&self) -> usize {
        let mut pages: Vec<u32> = self.fragments.iter().map(|f| f.page).collect();
        pages.dedup();
        pages.len()
    }
}

/// Buffers `bytes` to a temporary file and extracts one fragment per page.
pub fn extract_pdf_pages(bytes: &[u8]) -> Result<Vec<Fragment>, ExtractError> {
    let upload = TempUpload::write(bytes, ".pdf")?;
    extract_pages_from_path(upload.path())
}

/// As [`extract_pdf_pages`], buffering under `dir`.
pub fn extract_pdf_pages_in(dir: &Path, bytes: &[u8]) -> Result<Vec<Fragment>, ExtractError> {
    let upload = TempUpload::write_in(dir, bytes, ".pdf")?;
    extract_pages_from_path(upload.path())
}

pub fn extract_pages_from_path(path: &Path) -> Result<Vec<Fragment>, ExtractError> {
    let doc = Document::load(path).map_err(|e| ExtractError::Pdf(e.to_string()))?;

    let mut fragments = Vec::new();
    for page_number in doc.get_pages().keys() {
        let text = doc
            .extract_text(&[*page_number])
            .map_err(|e| ExtractError::Pdf(e.to_string()))?;
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        fragments.push(Fragment {
            text: text.to_string(),
            page: *page_number,
            index: fragments.len(),
        });
    }

    Ok(fragments)
}

pub fn extract_document(file_name: &str, bytes: &[u8]) -> ExtractedDocument {
    match extract_pdf_pages(bytes) {
        Ok(fragments) => {
            tracing::info!("Extracted {} pages of text from {}", fragments.len(), file_name);
            ExtractedDocument {
                file_name: file_name.to_string(),
                fragments,
                error: None,
            }
        }
        Err(err) => {
            tracing::warn!("Could not extract {}: {}", file_name, err);
            ExtractedDocument {
                file_name: file_name.to_string(),
                fragments: Vec::new(),
                error: Some(err.to_string()),
            }
        }
    }
}

/// Runs [`extract_document`] on the blocking pool.
pub async fn extract_uploaded(
    file_name: String,
    bytes: Vec<u8>,
) -> Result<ExtractedDocument, ApiError> {
    tokio::task::spawn_blocking(move || extract_document(&file_name, &bytes))
        .await
        .map_err(ApiError::internal)
}
