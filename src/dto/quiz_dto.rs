use crate::models::question::{CorrectAnswer, QuestionType};
use crate::models::quiz::{Difficulty, QuizSettings};
use serde::{Deserialize, Serialize};

/// Transport-safe form of a quiz draft: every media slot is a URL or data URI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuizPayload {
    pub title: String,
    pub description: String,
    pub subject: String,
    pub difficulty: Difficulty,
    pub questions: Vec<CreateQuestionPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    pub settings: QuizSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionPayload {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub question: String,
    pub content: Vec<EncodedContent>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub options: Vec<EncodedOption>,
    pub correct_answer: CorrectAnswer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub points: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EncodedContent {
    Text { text: String },
    Image { src: String },
    Audio { src: String },
    Video { src: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EncodedOption {
    Text(String),
    Image {
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        image: Option<String>,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuizPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<QuizSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedQuizzes {
    #[serde(alias = "quizzes")]
    pub items: Vec<crate::models::quiz::Quiz>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u64,
}
