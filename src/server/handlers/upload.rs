use std::collections::HashMap;

use axum::extract::Multipart;

use crate::core::errors::ApiError;

const FILE_FIELD: &str = "file";
const DEFAULT_FILE_NAME: &str = "upload.pdf";

pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// A multipart body holding at most one `file` part plus plain text fields.
pub struct UploadForm {
    file: Option<UploadedFile>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut file = None;
        let mut fields = HashMap::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == FILE_FIELD {
                let file_name = field
                    .file_name()
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or(DEFAULT_FILE_NAME)
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
                tracing::debug!("Received upload {} ({} bytes)", file_name, bytes.len());
                file = Some(UploadedFile {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid field {}: {}", name, e)))?;
                fields.insert(name, value);
            }
        }

        Ok(Self { file, fields })
    }

    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or_default()
    }

    pub fn into_file(self) -> Result<UploadedFile, ApiError> {
        self.file
            .ok_or_else(|| ApiError::BadRequest(format!("Missing '{}' field", FILE_FIELD)))
    }
}
