//! Document question answering.
//!
//! This module provides:
//! - `DocumentIndex`: fragments of one document with their embeddings
//! - `RetrievalQa`: top-k retrieval followed by a single grounded generation

mod index;
mod qa;

pub use index::{DocumentIndex, ScoredFragment};
pub use qa::{GroundedAnswer, RetrievalQa, EMPTY_DOCUMENT_WARNING, MISSING_QUESTION_WARNING};
