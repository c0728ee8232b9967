use serde_json::{json, Value};

/// Built-in configuration. `config.yml` and `secrets.yaml` are merged over this.
pub fn default_config() -> Value {
    json!({
        "server": {
            "host": "127.0.0.1",
            "port": 8000,
            "max_upload_mb": 50,
            "session_ttl_secs": 3600,
            "cors_allowed_origins": []
        },
        "llm": {
            "provider": "ollama",
            "base_url": "http://localhost:11434",
            "model": "phi3",
            "embedding_model": "nomic-embed-text",
            "api_key": null,
            "request_timeout_secs": 600,
            "temperature": null,
            "max_tokens": null
        },
        "prompts": {
            "lesson_plan_path": "prompts/prompt_lessonplan.txt",
            "worksheet_path": "prompts/prompt_worksheet.txt"
        },
        "rag": {
            "chunk_size": 1000,
            "chunk_overlap": 100,
            "top_k": 4,
            "embed_batch_size": 32
        }
    })
}
