//! In-memory similarity index over one document's fragments.

use serde::Serialize;

use crate::core::errors::ApiError;
use crate::document::Fragment;
use crate::llm::Embedder;
use crate::vector_math::rank_descending_by_cosine;

/// A fragment returned by a similarity search.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredFragment {
    #[serde(flatten)]
    pub fragment: Fragment,
    /// Cosine similarity to the query (higher = better).
    pub score: f32,
}

#[derive(Debug, Clone)]
pub struct DocumentIndex {
    file_name: String,
    fragments: Vec<Fragment>,
    embeddings: Vec<Vec<f32>>,
}

impl DocumentIndex {
    /// Embeds every fragment in batches of `batch_size` and indexes the full set.
    pub async fn build<E>(
        file_name: &str,
        fragments: Vec<Fragment>,
        embedder: &E,
        batch_size: usize,
    ) -> Result<Self, ApiError>
    where
        E: Embedder + ?Sized,
    {
        let mut embeddings = Vec::with_capacity(fragments.len());
        for batch in fragments.chunks(batch_size.max(1)) {
            let inputs: Vec<String> = batch.iter().map(|f| f.text.clone()).collect();
            embeddings.extend(embedder.embed(&inputs).await?);
        }

        tracing::info!("Indexed {} fragments of {}", fragments.len(), file_name);
        Self::from_parts(file_name, fragments, embeddings)
    }

    pub fn from_parts(
        file_name: &str,
        fragments: Vec<Fragment>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Self, ApiError> {
        if fragments.len() != embeddings.len() {
            return Err(ApiError::Upstream(format!(
                "Got {} embeddings for {} fragments",
                embeddings.len(),
                fragments.len()
            )));
        }
        Ok(Self {
            file_name: file_name.to_string(),
            fragments,
            embeddings,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Top `limit` fragments by cosine similarity, best first.
    pub fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredFragment>, ApiError> {
        let ranked = rank_descending_by_cosine(query_embedding, &self.embeddings)?;
        Ok(ranked
            .into_iter()
            .take(limit)
            .map(|(idx, score)| ScoredFragment {
                fragment: self.fragments[idx].clone(),
                score,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeLlm;

    fn fragment(text: &str, index: usize) -> Fragment {
        Fragment {
            text: text.to_string(),
            page: index as u32 + 1,
            index,
        }
    }

    #[tokio::test]
    async fn build_embeds_in_batches() {
        let embedder = FakeLlm::new(&["fraction", "decimal"]);
        let fragments = vec![
            fragment("fraction basics", 0),
            fragment("decimal places", 1),
            fragment("fraction and decimal", 2),
        ];

        let index = DocumentIndex::build("math.pdf", fragments, &embedder, 2)
            .await
            .unwrap();

        assert_eq!(index.len(), 3);
        assert_eq!(embedder.embed_calls(), 2);
        assert_eq!(index.file_name(), "math.pdf");
    }

    #[tokio::test]
    async fn search_returns_best_matches_first() {
        let embedder = FakeLlm::new(&["fraction", "decimal", "angle"]);
        let fragments = vec![
            fragment("angles in triangles", 0),
            fragment("adding a fraction to a fraction", 1),
            fragment("decimal notation", 2),
        ];
        let index = DocumentIndex::build("math.pdf", fragments, &embedder, 32)
            .await
            .unwrap();

        let query = embedder.embed(&["what is a fraction".to_string()]).await.unwrap();
        let hits = index.search(&query[0], 2).unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].fragment.index, 1);
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn mismatched_parts_are_rejected() {
        let err = DocumentIndex::from_parts("x.pdf", vec![fragment("a", 0)], vec![]).unwrap_err();
        assert!(matches!(err, ApiError::Upstream(_)));
    }
}
