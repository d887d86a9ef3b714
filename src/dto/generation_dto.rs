use crate::models::question::QuestionDraft;
use crate::models::quiz::Difficulty;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Shortest pasted text the generator accepts, counted in characters.
pub const MIN_SOURCE_TEXT_CHARS: usize = 20;
pub const SOURCE_TEXT_TOO_SHORT: &str = "Please provide at least 20 characters of text.";

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateFromTextPayload {
    #[validate(length(min = 20, message = "Please provide at least 20 characters of text."))]
    pub text: String,
    #[validate(range(min = 1, max = 50, message = "Question count must be between 1 and 50"))]
    pub question_count: u32,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateFromUrlPayload {
    #[validate(url(message = "Please enter a valid URL."))]
    pub url: String,
    #[validate(range(min = 1, max = 50, message = "Question count must be between 1 and 50"))]
    pub question_count: u32,
    pub difficulty: Difficulty,
}

/// Questions proposed by the generation backend, ready to drop into a draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    pub questions: Vec<QuestionDraft>,
}

/// What an AI-assisted quiz is generated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationSource {
    Pdf(std::path::PathBuf),
    Image(std::path::PathBuf),
    Text(String),
    Url(String),
}

impl GenerationSource {
    pub fn label(&self) -> &'static str {
        match self {
            GenerationSource::Pdf(_) => "pdf",
            GenerationSource::Image(_) => "image",
            GenerationSource::Text(_) => "text",
            GenerationSource::Url(_) => "url",
        }
    }
}
