//! Keyword heuristic over free-text student answers.
//!
//! This is a placeholder, not a grader: a sentence is flagged when it is
//! longer than [`FLAG_MIN_CHARS`] and contains "not" in any case. Nothing
//! about the answer's correctness is checked.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::core::errors::ApiError;
use crate::llm::TextGenerator;
use crate::prompts::build_follow_up_prompt;

pub const FLAG_MIN_CHARS: usize = 10;
pub const MISSING_ANSWERS_WARNING: &str = "Please enter the student's answers.";

const FLAG_KEYWORD: &str = "not";

static SENTENCE_RE: OnceLock<Regex> = OnceLock::new();

fn sentence_re() -> &'static Regex {
    SENTENCE_RE.get_or_init(|| Regex::new(r"[^.!?]+[.!?]*").expect("sentence pattern is valid"))
}

#[derive(Debug, Clone, Serialize)]
pub struct FlaggedSentence {
    pub sentence: String,
    pub follow_up: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub sentences_checked: usize,
    pub flagged: Vec<FlaggedSentence>,
}

/// Splits on `.`, `!` and `?`, keeping the terminator with its sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    sentence_re()
        .find_iter(text)
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn is_flagged(sentence: &str) -> bool {
    let trimmed = sentence.trim();
    trimmed.chars().count() > FLAG_MIN_CHARS && trimmed.to_lowercase().contains(FLAG_KEYWORD)
}

pub async fn evaluate_answers<G>(answers: &str, generator: &G) -> Result<Evaluation, ApiError>
where
    G: TextGenerator + ?Sized,
{
    if answers.trim().is_empty() {
        return Err(ApiError::warning(MISSING_ANSWERS_WARNING));
    }

    let sentences = split_sentences(answers);
    let mut flagged = Vec::new();
    for sentence in sentences.iter().filter(|s| is_flagged(s)) {
        let follow_up = generator.generate(&build_follow_up_prompt(sentence)).await?;
        flagged.push(FlaggedSentence {
            sentence: sentence.clone(),
            follow_up,
        });
    }

    tracing::info!(
        "Evaluated {} sentences, {} flagged",
        sentences.len(),
        flagged.len()
    );

    Ok(Evaluation {
        sentences_checked: sentences.len(),
        flagged,
    })
}
