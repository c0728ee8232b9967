use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::core::config::{LlmSettings, ProviderKind};
use crate::core::errors::ApiError;
use crate::llm::ollama::OllamaProvider;
use crate::llm::openai_compat::OpenAiCompatProvider;
use crate::llm::provider::{Embedder, LlmProvider, TextGenerator};
use crate::llm::types::{GenerationOptions, ProviderModel};

/// Shared handle to the configured backend.
#[derive(Clone)]
pub struct LlmService {
    provider: Arc<dyn LlmProvider>,
}

impl LlmService {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    pub fn from_settings(settings: &LlmSettings) -> Result<Self, ApiError> {
        let timeout = Duration::from_secs(settings.request_timeout_secs);
        let options = GenerationOptions {
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        };

        let provider: Arc<dyn LlmProvider> = match settings.provider {
            ProviderKind::Ollama => Arc::new(
                OllamaProvider::new(
                    settings.base_url.clone(),
                    settings.model.clone(),
                    settings.embedding_model.clone(),
                    timeout,
                )?
                .with_options(options),
            ),
            ProviderKind::OpenaiCompatible => Arc::new(
                OpenAiCompatProvider::new(
                    settings.base_url.clone(),
                    settings.model.clone(),
                    settings.embedding_model.clone(),
                    timeout,
                )?
                .with_api_key(settings.api_key.clone())
                .with_options(options),
            ),
        };

        tracing::info!(
            "LLM backend: {} at {} (model {}, embeddings {})",
            provider.name(),
            settings.base_url,
            settings.model,
            settings.embedding_model
        );

        Ok(Self::new(provider))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub async fn health_check(&self) -> bool {
        match self.provider.health_check().await {
            Ok(healthy) => healthy,
            Err(err) => {
                tracing::debug!("Health check failed for {}: {}", self.provider.name(), err);
                false
            }
        }
    }

    pub async fn list_models(&self) -> Result<Vec<ProviderModel>, ApiError> {
        self.provider.list_models().await
    }
}

#[async_trait]
impl TextGenerator for LlmService {
    async fn generate(&self, prompt: &str) -> Result<String, ApiError> {
        tracing::debug!(
            "Generating with {} ({} prompt chars)",
            self.provider.name(),
            prompt.chars().count()
        );
        self.provider.generate(prompt).await.map_err(|err| {
            tracing::warn!("Generation failed on {}: {}", self.provider.name(), err);
            err
        })
    }
}

#[async_trait]
impl Embedder for LlmService {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        tracing::debug!("Embedding {} inputs with {}", inputs.len(), self.provider.name());
        self.provider.embed(inputs).await.map_err(|err| {
            tracing::warn!("Embedding failed on {}: {}", self.provider.name(), err);
            err
        })
    }
}
