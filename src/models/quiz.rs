use crate::models::media::MediaRef;
use crate::models::question::QuestionDraft;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A quiz being authored. Lives only in the wizard until it is submitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub questions: Vec<QuestionDraft>,
    #[serde(default)]
    pub cover_image: Option<MediaRef>,
    #[serde(default)]
    pub settings: QuizSettings,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSettings {
    #[serde(default)]
    pub time_limit_minutes: Option<u32>,
    #[serde(default)]
    pub question_timer_seconds: Option<u32>,
    #[serde(default)]
    pub max_attempts: Option<u32>,
    #[serde(default)]
    pub randomize_questions: bool,
    #[serde(default)]
    pub randomize_options: bool,
    #[serde(default = "default_true")]
    pub allow_review: bool,
    #[serde(default = "default_true")]
    pub show_explanations: bool,
    #[serde(default)]
    pub visibility: Visibility,
}

fn default_true() -> bool {
    true
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            time_limit_minutes: None,
            question_timer_seconds: None,
            max_attempts: None,
            randomize_questions: false,
            randomize_options: false,
            allow_review: true,
            show_explanations: true,
            visibility: Visibility::Public,
        }
    }
}

/// A quiz as the server reports it back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub question_count: Option<u32>,
    #[serde(default)]
    pub questions: Vec<serde_json::Value>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Quiz {
    pub fn total_questions(&self) -> usize {
        self.question_count
            .map(|c| c as usize)
            .unwrap_or(self.questions.len())
    }
}
