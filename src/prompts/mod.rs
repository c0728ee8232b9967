//! Prompt templates and the prompts built from them.

mod builder;
mod template;

pub use builder::{
    build_document_prompt, build_follow_up_prompt, build_material_prompt, build_qa_prompt,
    MISSING_MATERIAL_WARNING, MISSING_TOPIC_WARNING,
};
pub use template::{
    MaterialKind, PromptTemplate, TemplateSet, GRADE_LEVEL_PLACEHOLDER, TOPIC_PLACEHOLDER,
};
