pub mod ollama;
pub mod openai_compat;
pub mod provider;
pub mod service;
pub mod types;


pub use provider::{Embedder, LlmProvider, TextGenerator};
pub use service::LlmService;
pub use types::{ChatMessage, GenerationOptions, ProviderModel};
