use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::errors::ApiError;
use super::provider::{Embedder, LlmProvider, TextGenerator};
use super::types::{ChatMessage, GenerationOptions, ProviderModel};

/// Backend for servers that speak the OpenAI REST dialect (LM Studio,
/// vLLM, text-generation-inference hosting a pretrained seq2seq model).
#[derive(Clone)]
pub struct OpenAiCompatProvider {
    base_url: String,
    client: Client,
    api_key: Option<String>,
    model: String,
    embedding_model: String,
    options: GenerationOptions,
}

impl OpenAiCompatProvider {
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
            api_key: None,
            model,
            embedding_model,
            options: GenerationOptions::default(),
        })
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|key| !key.trim().is_empty());
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }
}

#[derive(Deserialize)]
struct OpenAiModelsResponse {
    data: Vec<OpenAiModelInfo>,
}

#[derive(Deserialize)]
struct OpenAiModelInfo {
    id: String,
}

#[async_trait]
impl TextGenerator for OpenAiCompatProvider {
    async fn generate(&self, prompt: &str) -> Result<String, ApiError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let mut body = json!({
            "model": self.model,
            "messages": [ChatMessage::user(prompt)],
            "stream": false,
        });

        if let Some(obj) = body.as_object_mut() {
            if let Some(t) = self.options.temperature {
                obj.insert("temperature".to_string(), json!(t));
            }
            if let Some(t) = self.options.max_tokens {
                obj.insert("max_tokens".to_string(), json!(t));
            }
        }

        let res = self
            .authorize(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(ApiError::upstream)?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Upstream(format!("Chat completion error: {}", text)));
        }

        let payload: Value = res.json().await.map_err(ApiError::upstream)?;

        // First choice only.
        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ApiError::Upstream("Chat completion has no choices".to_string()))
    }
}

#[async_trait]
impl Embedder for OpenAiCompatProvider {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/v1/embeddings", self.base_url);

        let body = json!({
            "model": self.embedding_model,
            "input": inputs,
        });

        let res = self
            .authorize(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(ApiError::upstream)?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Upstream(format!("Embedding error: {}", text)));
        }

        let payload: Value = res.json().await.map_err(ApiError::upstream)?;

        let embeddings = parse_embeddings(&payload)?;

        if embeddings.len() != inputs.len() {
            return Err(ApiError::Upstream(format!(
                "Embedding server returned {} vectors for {} inputs",
                embeddings.len(),
                inputs.len()
            )));
        }

        Ok(embeddings)
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        "openai_compatible"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        let url = format!("{}/v1/models", self.base_url);
        let res = self.authorize(self.client.get(&url)).send().await;
        match res {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    async fn list_models(&self) -> Result<Vec<ProviderModel>, ApiError> {
        let url = format!("{}/v1/models", self.base_url);
        let res = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(ApiError::upstream)?;

        if !res.status().is_success() {
            return Err(ApiError::Upstream(format!("Failed to list models: {}", res.status())));
        }

        let response: OpenAiModelsResponse = res.json().await.map_err(ApiError::upstream)?;

        Ok(response
            .data
            .into_iter()
            .map(|m| ProviderModel {
                id: m.id.clone(),
                name: m.id,
            })
            .collect())
    }
}

/// Vectors from an embeddings response, ordered by each item's `index`.
fn parse_embeddings(payload: &Value) -> Result<Vec<Vec<f32>>, ApiError> {
    let data = payload["data"]
        .as_array()
        .ok_or_else(|| ApiError::Upstream("Embedding response has no data".to_string()))?;

    let mut indexed = Vec::with_capacity(data.len());
    for (position, item) in data.iter().enumerate() {
        let index = item["index"].as_u64().map_or(position, |i| i as usize);
        let values = item["embedding"].as_array().ok_or_else(|| {
            ApiError::Upstream(format!("Embedding {} has no vector", index))
        })?;
        let vector = values
            .iter()
            .map(|v| v.as_f64().map(|f| f as f32))
            .collect::<Option<Vec<f32>>>()
            .ok_or_else(|| {
                ApiError::Upstream(format!("Embedding {} contains a non-numeric value", index))
            })?;
        indexed.push((index, vector));
    }

    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, vector)| vector).collect())
}
