use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregates the dashboard page renders; computed server-side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    #[serde(default)]
    pub total_quizzes: u64,
    #[serde(default)]
    pub total_sessions: u64,
    #[serde(default)]
    pub total_participants: u64,
    #[serde(default)]
    pub average_score: Option<f64>,
    #[serde(default)]
    pub recent_quizzes: Vec<QuizSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
