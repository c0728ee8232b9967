use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub const TOPIC_PLACEHOLDER: &str = "<INSERT_TOPIC_HERE>";
pub const GRADE_LEVEL_PLACEHOLDER: &str = "<INSERT_GRADE_LEVEL_HERE>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialKind {
    LessonPlan,
    Worksheet,
}

impl MaterialKind {
    pub fn label(&self) -> &'static str {
        match self {
            MaterialKind::LessonPlan => "Lesson Plan",
            MaterialKind::Worksheet => "Worksheet",
        }
    }
}

/// A template file with placeholder tokens, read once at startup.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    text: String,
    loaded: bool,
}

impl PromptTemplate {
    /// Reads `path`. A missing or unreadable file does not fail: the
    /// template becomes a visible placeholder message and is used as-is.
    pub fn load(path: &Path) -> Self {
        let source = path.display().to_string();
        match fs::read_to_string(path) {
            Ok(text) => Self { text, loaded: true },
            Err(err) => {
                tracing::warn!("Prompt template {} unavailable: {}", source, err);
                Self {
                    text: format!("Error: {} not found.", source),
                    loaded: false,
                }
            }
        }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            loaded: true,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Substitutes every placeholder occurrence verbatim.
    pub fn fill(&self, topic: &str, grade_level: &str) -> String {
        self.text
            .replace(TOPIC_PLACEHOLDER, topic)
            .replace(GRADE_LEVEL_PLACEHOLDER, grade_level)
    }
}

#[derive(Debug, Clone)]
pub struct TemplateSet {
    pub lesson_plan: PromptTemplate,
    pub worksheet: PromptTemplate,
}

impl TemplateSet {
    pub fn load(lesson_plan_path: &Path, worksheet_path: &Path) -> Self {
        let set = Self {
            lesson_plan: PromptTemplate::load(lesson_plan_path),
            worksheet: PromptTemplate::load(worksheet_path),
        };
        tracing::info!(
            "Prompt templates: lesson plan {}, worksheet {}",
            if set.lesson_plan.is_loaded() { "loaded" } else { "missing" },
            if set.worksheet.is_loaded() { "loaded" } else { "missing" },
        );
        set
    }

    pub fn get(&self, kind: MaterialKind) -> &PromptTemplate {
        match kind {
            MaterialKind::LessonPlan => &self.lesson_plan,
            MaterialKind::Worksheet => &self.worksheet,
        }
    }
}
