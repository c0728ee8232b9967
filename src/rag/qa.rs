//! Retrieval QA: answer a question from the fragments of one document and
//! return those fragments alongside the answer.

use serde::Serialize;

use super::index::{DocumentIndex, ScoredFragment};
use crate::core::errors::ApiError;
use crate::document::{extract_uploaded, Fragment};
use crate::llm::{Embedder, TextGenerator};
use crate::prompts::build_qa_prompt;

pub const MISSING_QUESTION_WARNING: &str = "Please enter a question.";
pub const EMPTY_DOCUMENT_WARNING: &str = "The uploaded document has no extractable text.";

/// An answer paired with the exact fragments used to produce it.
#[derive(Debug, Clone, Serialize)]
pub struct GroundedAnswer {
    pub question: String,
    pub answer: String,
    /// Retrieved fragments in rank order.
    pub sources: Vec<ScoredFragment>,
}

pub struct RetrievalQa<'a, G: ?Sized, E: ?Sized> {
    generator: &'a G,
    embedder: &'a E,
    top_k: usize,
}

impl<'a, G, E> RetrievalQa<'a, G, E>
where
    G: TextGenerator + ?Sized,
    E: Embedder + ?Sized,
{
    pub fn new(generator: &'a G, embedder: &'a E, top_k: usize) -> Self {
        Self {
            generator,
            embedder,
            top_k: top_k.max(1),
        }
    }

    pub async fn ask(
        &self,
        index: &DocumentIndex,
        question: &str,
    ) -> Result<GroundedAnswer, ApiError> {
        if question.trim().is_empty() {
            return Err(ApiError::warning(MISSING_QUESTION_WARNING));
        }
        if index.is_empty() {
            return Err(ApiError::warning(EMPTY_DOCUMENT_WARNING));
        }

        let query = self
            .embedder
            .embed(&[question.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Upstream("No embedding returned for question".to_string()))?;

        let sources = index.search(&query, self.top_k)?;
        let context: Vec<Fragment> = sources.iter().map(|s| s.fragment.clone()).collect();
        let prompt = build_qa_prompt(question, &context);

        tracing::debug!(
            "Answering from {} of {} fragments of {}",
            context.len(),
            index.len(),
            index.file_name()
        );
        let answer = self.generator.generate(&prompt).await?;

        Ok(GroundedAnswer {
            question: question.to_string(),
            answer,
            sources,
        })
    }

    /// Extracts `bytes`, indexes the pages and answers `question` in one go.
    pub async fn answer_document(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        question: &str,
        batch_size: usize,
    ) -> Result<GroundedAnswer, ApiError> {
        if question.trim().is_empty() {
            return Err(ApiError::warning(MISSING_QUESTION_WARNING));
        }

        let document = extract_uploaded(file_name.to_string(), bytes).await?;
        if document.is_empty() {
            let message = match &document.error {
                Some(err) => format!("{} ({})", EMPTY_DOCUMENT_WARNING, err),
                None => EMPTY_DOCUMENT_WARNING.to_string(),
            };
            return Err(ApiError::warning(message));
        }

        let index =
            DocumentIndex::build(file_name, document.fragments, self.embedder, batch_size).await?;
        self.ask(&index, question).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{pdf_with_pages, FakeLlm};

    fn fragment(text: &str, index: usize) -> Fragment {
        Fragment {
            text: text.to_string(),
            page: index as u32 + 1,
            index,
        }
    }

    async fn index_of(llm: &FakeLlm, texts: &[&str]) -> DocumentIndex {
        let fragments = texts
            .iter()
            .enumerate()
            .map(|(i, t)| fragment(t, i))
            .collect();
        DocumentIndex::build("lesson.pdf", fragments, llm, 32).await.unwrap()
    }

    #[tokio::test]
    async fn answer_is_grounded_in_prompted_fragments() {
        let llm = FakeLlm::new(&["photosynthesis", "mitosis", "gravity"]).replying("Plants make sugar.");
        let index = index_of(
            &llm,
            &[
                "Gravity pulls objects together.",
                "Photosynthesis turns light into sugar.",
                "Mitosis splits one cell into two.",
            ],
        )
        .await;

        let qa = RetrievalQa::new(&llm, &llm, 2);
        let result = qa.ask(&index, "How does photosynthesis work?").await.unwrap();

        assert_eq!(result.answer, "Plants make sugar.");
        assert_eq!(result.sources.len(), 2);
        assert_eq!(result.sources[0].fragment.index, 1);

        let prompts = llm.prompts();
        assert_eq!(prompts.len(), 1);
        for source in &result.sources {
            assert!(prompts[0].contains(&source.fragment.text));
        }
        assert!(!prompts[0].contains("Mitosis"));
    }

    #[tokio::test]
    async fn top_k_larger_than_document_returns_every_fragment() {
        let llm = FakeLlm::new(&["cell"]);
        let index = index_of(&llm, &["cell walls", "cell membranes"]).await;

        let result = RetrievalQa::new(&llm, &llm, 4)
            .ask(&index, "What is a cell?")
            .await
            .unwrap();

        assert_eq!(result.sources.len(), 2);
    }

    #[tokio::test]
    async fn empty_question_makes_no_backend_calls() {
        let llm = FakeLlm::new(&["cell"]);
        let index = index_of(&llm, &["cell walls"]).await;
        let embeds_before = llm.embed_calls();

        let err = RetrievalQa::new(&llm, &llm, 4).ask(&index, "   ").await.unwrap_err();

        assert!(err.is_warning());
        assert_eq!(llm.embed_calls(), embeds_before);
        assert_eq!(llm.generate_calls(), 0);
    }

    #[tokio::test]
    async fn generation_failure_propagates() {
        let llm = FakeLlm::new(&["cell"]).failing();
        let index = index_of(&llm, &["cell walls"]).await;

        let err = RetrievalQa::new(&llm, &llm, 4)
            .ask(&index, "What is a cell?")
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Upstream(_)));
    }

    #[tokio::test]
    async fn one_shot_flow_answers_from_uploaded_pdf() {
        let llm = FakeLlm::new(&["numerator", "denominator"]).replying("The top number.");
        let pdf = pdf_with_pages(&["The numerator is on top", "The denominator is below"]);

        let result = RetrievalQa::new(&llm, &llm, 1)
            .answer_document("fractions.pdf", pdf, "What is a numerator?", 32)
            .await
            .unwrap();

        assert_eq!(result.answer, "The top number.");
        assert_eq!(result.sources.len(), 1);
        assert!(result.sources[0].fragment.text.contains("numerator"));
    }

    #[tokio::test]
    async fn one_shot_flow_with_unparsable_upload_is_a_warning() {
        let llm = FakeLlm::new(&["x"]);

        let err = RetrievalQa::new(&llm, &llm, 4)
            .answer_document("broken.pdf", b"not a pdf".to_vec(), "Anything?", 32)
            .await
            .unwrap_err();

        assert!(err.is_warning());
        assert_eq!(llm.generate_calls(), 0);
        assert_eq!(llm.embed_calls(), 0);
    }
}
