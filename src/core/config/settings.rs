//! Typed view over the merged configuration tree.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub llm: LlmSettings,
    pub prompts: PromptSettings,
    pub rag: RagSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub max_upload_mb: u64,
    /// Idle time after which a session and its document are dropped.
    pub session_ttl_secs: u64,
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

impl ServerSettings {
    pub fn max_upload_bytes(&self) -> usize {
        (self.max_upload_mb as usize).saturating_mul(1024 * 1024)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Local Ollama server (`/api/generate`, `/api/embed`).
    Ollama,
    /// Any server speaking the OpenAI REST dialect, e.g. one hosting a
    /// pretrained seq2seq model.
    OpenaiCompatible,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    pub provider: ProviderKind,
    pub base_url: String,
    pub model: String,
    pub embedding_model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptSettings {
    pub lesson_plan_path: String,
    pub worksheet_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagSettings {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub embed_batch_size: usize,
}

