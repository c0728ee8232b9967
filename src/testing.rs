//! Test doubles shared by the unit tests and the `tests/` suites.
//!
//! Compiled for `cfg(test)` and behind the `test-support` feature, which
//! integration tests rely on.

use std::iter;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::core::errors::ApiError;
use crate::llm::{Embedder, LlmProvider, ProviderModel, TextGenerator};

/// In-process model backend. Embeds text as keyword counts (plus a small
/// constant dimension so no vector is all zeros) and records every
/// generation prompt.
pub struct FakeLlm {
    keywords: Vec<String>,
    reply: String,
    fail_generate: bool,
    prompts: Mutex<Vec<String>>,
    embed_calls: AtomicUsize,
}

impl FakeLlm {
    pub fn new(keywords: &[&str]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            reply: "generated answer".to_string(),
            fail_generate: false,
            prompts: Mutex::new(Vec::new()),
            embed_calls: AtomicUsize::new(0),
        }
    }

    pub fn replying(mut self, reply: &str) -> Self {
        self.reply = reply.to_string();
        self
    }

    /// Generation fails with an upstream error; embedding still works.
    pub fn failing(mut self) -> Self {
        self.fail_generate = true;
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn generate_calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn embed_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for FakeLlm {
    async fn generate(&self, prompt: &str) -> Result<String, ApiError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail_generate {
            return Err(ApiError::Upstream("model server unavailable".to_string()));
        }
        Ok(self.reply.clone())
    }
}

#[async_trait]
impl Embedder for FakeLlm {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        Ok(inputs
            .iter()
            .map(|text| {
                let lower = text.to_lowercase();
                self.keywords
                    .iter()
                    .map(|k| lower.matches(k.as_str()).count() as f32)
                    .chain(iter::once(0.01))
                    .collect()
            })
            .collect())
    }
}

#[async_trait]
impl LlmProvider for FakeLlm {
    fn name(&self) -> &str {
        "fake"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        Ok(true)
    }

    async fn list_models(&self) -> Result<Vec<ProviderModel>, ApiError> {
        Ok(vec![ProviderModel {
            id: "fake".to_string(),
            name: "fake".to_string(),
        }])
    }
}

/// Builds a PDF with one page per entry; an empty entry yields a blank page.
pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
        ];
        if !text.is_empty() {
            operations.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
        }
        operations.push(Operation::new("ET", vec![]));
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}
