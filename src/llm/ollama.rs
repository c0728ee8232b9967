use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::core::errors::ApiError;
use super::provider::{Embedder, LlmProvider, TextGenerator};
use super::types::{GenerationOptions, ProviderModel};

#[derive(Clone)]
pub struct OllamaProvider {
    base_url: String,
    client: Client,
    model: String,
    embedding_model: String,
    options: GenerationOptions,
}

impl OllamaProvider {
    pub fn new(
        base_url: String,
        model: String,
        embedding_model: String,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::internal)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            model,
            embedding_model,
            options: GenerationOptions::default(),
        })
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    fn options_payload(&self) -> Option<Value> {
        let mut options = Map::new();
        if let Some(t) = self.options.temperature {
            options.insert("temperature".to_string(), json!(t));
        }
        if let Some(n) = self.options.max_tokens {
            options.insert("num_predict".to_string(), json!(n));
        }
        if options.is_empty() {
            None
        } else {
            Some(Value::Object(options))
        }
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagInfo>,
}

#[derive(Deserialize)]
struct TagInfo {
    name: String,
}

#[async_trait]
impl TextGenerator for OllamaProvider {
    async fn generate(&self, prompt: &str) -> Result<String, ApiError> {
        let url = format!("{}/api/generate", self.base_url);

        let mut body = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
        });
        if let (Some(obj), Some(options)) = (body.as_object_mut(), self.options_payload()) {
            obj.insert("options".to_string(), options);
        }

        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::upstream)?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Upstream(format!("Ollama generate error: {}", text)));
        }

        let payload: GenerateResponse = res.json().await.map_err(ApiError::upstream)?;
        payload.response.ok_or_else(|| {
            ApiError::Upstream("Ollama generate response has no 'response' field".to_string())
        })
    }
}

#[async_trait]
impl Embedder for OllamaProvider {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/api/embed", self.base_url);
        let body = json!({
            "model": self.embedding_model,
            "input": inputs,
        });

        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::upstream)?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Upstream(format!("Ollama embed error: {}", text)));
        }

        let payload: EmbedResponse = res.json().await.map_err(ApiError::upstream)?;
        if payload.embeddings.len() != inputs.len() {
            return Err(ApiError::Upstream(format!(
                "Ollama returned {} embeddings for {} inputs",
                payload.embeddings.len(),
                inputs.len()
            )));
        }

        Ok(payload.embeddings)
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        let url = format!("{}/api/tags", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    async fn list_models(&self) -> Result<Vec<ProviderModel>, ApiError> {
        let url = format!("{}/api/tags", self.base_url);
        let res = self.client.get(&url).send().await.map_err(ApiError::upstream)?;

        if !res.status().is_success() {
            return Err(ApiError::Upstream(format!(
                "Failed to list models: {}",
                res.status()
            )));
        }

        let tags: TagsResponse = res.json().await.map_err(ApiError::upstream)?;
        Ok(tags
            .models
            .into_iter()
            .map(|m| ProviderModel {
                id: m.name.clone(),
                name: m.name,
            })
            .collect())
    }
}
