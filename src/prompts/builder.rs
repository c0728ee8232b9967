use crate::core::errors::ApiError;
use crate::document::Fragment;
use super::template::{MaterialKind, PromptTemplate};

pub const MISSING_TOPIC_WARNING: &str = "Please enter both a topic and a grade level.";
pub const MISSING_MATERIAL_WARNING: &str = "Please enter or upload some content.";

const QA_PROMPT_HEADER: &str = "Use the following pieces of context to answer the question at the end. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.";

const FOLLOW_UP_INSTRUCTION: &str = "A student wrote the following sentence, which may contain a mistake. \
Ask the student one short follow-up question that helps them reconsider it.\n\nSentence: ";

/// Fills a material template. Blank topic or grade level is rejected
/// before anything is sent to the model.
pub fn build_material_prompt(
    template: &PromptTemplate,
    topic: &str,
    grade_level: &str,
) -> Result<String, ApiError> {
    if topic.trim().is_empty() || grade_level.trim().is_empty() {
        return Err(ApiError::warning(MISSING_TOPIC_WARNING));
    }
    Ok(template.fill(topic, grade_level))
}

/// Prompt for generating material from reviewed document text.
pub fn build_document_prompt(kind: MaterialKind, material: &str) -> Result<String, ApiError> {
    if material.trim().is_empty() {
        return Err(ApiError::warning(MISSING_MATERIAL_WARNING));
    }
    let prompt = match kind {
        MaterialKind::LessonPlan => format!(
            "Create a detailed lesson plan based on the following material:\n\n{}",
            material
        ),
        MaterialKind::Worksheet => format!(
            "Generate 10 practice problems for students based on the following material:\n\n{}",
            material
        ),
    };
    Ok(prompt)
}

/// Stuffs the retrieved fragments, in rank order, into a single QA prompt.
pub fn build_qa_prompt(question: &str, context: &[Fragment]) -> String {
    let context = context
        .iter()
        .map(|f| f.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "{}\n\n{}\n\nQuestion: {}\nHelpful Answer:",
        QA_PROMPT_HEADER, context, question
    )
}

pub fn build_follow_up_prompt(sentence: &str) -> String {
    format!("{}{}", FOLLOW_UP_INSTRUCTION, sentence)
}
