use crate::models::media::MediaRef;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDraft {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub content: Vec<ContentItem>,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
    #[serde(default, rename = "correctAnswer")]
    pub correct_answer: Option<CorrectAnswer>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default = "default_points")]
    pub points: u32,
}

fn default_points() -> u32 {
    1
}

impl QuestionDraft {
    pub fn new(question_type: QuestionType, question: impl Into<String>) -> Self {
        Self {
            question_type,
            question: question.into(),
            content: Vec::new(),
            options: Vec::new(),
            correct_answer: None,
            explanation: None,
            points: default_points(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
    FillInTheBlank,
}

impl QuestionType {
    pub fn label(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple-choice",
            QuestionType::TrueFalse => "true-false",
            QuestionType::ShortAnswer => "short-answer",
            QuestionType::FillInTheBlank => "fill-in-the-blank",
        }
    }
}

/// Body blocks shown alongside the prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentItem {
    Text { text: String },
    Image { src: MediaRef },
    Audio { src: MediaRef },
    Video { src: MediaRef },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionOption {
    Text(String),
    Image(ImageOption),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageOption {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub image: Option<MediaRef>,
}

impl QuestionOption {
    /// True when the option carries visible text or an attached image.
    pub fn has_content(&self) -> bool {
        match self {
            QuestionOption::Text(text) => !text.trim().is_empty(),
            QuestionOption::Image(opt) => {
                opt.text.as_deref().is_some_and(|t| !t.trim().is_empty())
                    || opt.image.as_ref().is_some_and(|m| !m.is_empty())
            }
        }
    }
}

/// The stored answer. Kept untagged so a JSON `"true"` string stays text
/// and never counts as a boolean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CorrectAnswer {
    Bool(bool),
    Index(i64),
    Text(String),
}
