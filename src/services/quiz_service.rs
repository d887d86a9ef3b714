use crate::dto::quiz_dto::{CreateQuizPayload, PaginatedQuizzes, UpdateQuizPayload};
use crate::error::Result;
use crate::models::quiz::Quiz;
use crate::services::api_client::ApiClient;
use crate::services::endpoints;
use reqwest::Method;
use tracing::info;

#[derive(Clone)]
pub struct QuizService {
    api: ApiClient,
}

impl QuizService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn create_quiz(&self, payload: &CreateQuizPayload) -> Result<Quiz> {
        info!(
            title = %payload.title,
            questions = payload.questions.len(),
            "creating quiz"
        );
        let quiz: Quiz = self.api.post(endpoints::QUIZZES, payload).await?;
        Ok(quiz)
    }

    pub async fn list_quizzes(&self, page: u32, per_page: u32) -> Result<PaginatedQuizzes> {
        self.api
            .send(
                self.api
                    .request(Method::GET, endpoints::QUIZZES)
                    .query(&[("page", page), ("limit", per_page)]),
            )
            .await
    }

    pub async fn get_quiz(&self, id: &str) -> Result<Quiz> {
        self.api.get(&endpoints::quiz(id)).await
    }

    pub async fn update_quiz(&self, id: &str, payload: &UpdateQuizPayload) -> Result<Quiz> {
        info!(quiz_id = %id, "updating quiz");
        self.api.patch(&endpoints::quiz(id), payload).await
    }

    pub async fn delete_quiz(&self, id: &str) -> Result<()> {
        info!(quiz_id = %id, "deleting quiz");
        self.api.delete(&endpoints::quiz(id)).await
    }
}
