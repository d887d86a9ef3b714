use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    Lobby,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub joined_at: Option<DateTime<Utc>>,
}

/// Live session state exactly as the server last reported it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSessionView {
    pub code: String,
    pub status: SessionStatus,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub quiz_title: Option<String>,
}

impl QuizSessionView {
    /// Adds a participant unless the server already listed them.
    pub fn upsert_participant(&mut self, participant: Participant) {
        match self.participants.iter_mut().find(|p| p.id == participant.id) {
            Some(existing) => *existing = participant,
            None => self.participants.push(participant),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantResult {
    pub name: String,
    pub score: u32,
    pub correct_answers: u32,
    pub total_questions: u32,
    #[serde(default)]
    pub time_taken_seconds: Option<u32>,
}

impl ParticipantResult {
    pub fn percentage(&self) -> f64 {
        if self.total_questions == 0 {
            0.0
        } else {
            f64::from(self.correct_answers) * 100.0 / f64::from(self.total_questions)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResults {
    pub code: String,
    #[serde(default)]
    pub quiz_title: Option<String>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub participants: Vec<ParticipantResult>,
}
