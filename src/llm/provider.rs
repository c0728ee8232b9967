use async_trait::async_trait;

use crate::core::errors::ApiError;
use super::types::ProviderModel;

/// The one capability the orchestration flows need from a model.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ApiError>;
}

#[async_trait]
pub trait Embedder: Send + Sync {
    /// One vector per input, in input order.
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError>;
}

#[async_trait]
pub trait LlmProvider: TextGenerator + Embedder {
    /// return the provider name (e.g. "ollama", "openai_compatible")
    fn name(&self) -> &str;

    /// check if the provider is healthy/reachable
    async fn health_check(&self) -> Result<bool, ApiError>;

    /// list available models from the provider
    async fn list_models(&self) -> Result<Vec<ProviderModel>, ApiError>;
}
