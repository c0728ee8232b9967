//! Backend for a classroom assistant: lesson plans and worksheets from
//! prompt templates, retrieval Q&A over uploaded PDFs, and a heuristic
//! student-answer checker, served over HTTP.

pub mod core;
pub mod document;
pub mod evaluation;
pub mod llm;
pub mod prompts;
pub mod rag;
pub mod server;
pub mod session;
pub mod state;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod vector_math;
