use crate::dto::session_dto::{JoinSessionRequest, VerifyCodeRequest, VerifyCodeResponse};
use crate::error::Result;
use crate::models::session::{Participant, QuizSessionView, SessionResults};
use crate::services::api_client::ApiClient;
use crate::services::endpoints;
use tracing::info;

/// REST side of live sessions. Push updates arrive over the real-time channel.
#[derive(Clone)]
pub struct SessionService {
    api: ApiClient,
}

impl SessionService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn verify_code(&self, code: &str) -> Result<VerifyCodeResponse> {
        let req = VerifyCodeRequest {
            code: code.to_string(),
        };
        self.api.post(endpoints::SESSION_VERIFY, &req).await
    }

    pub async fn join(&self, code: &str, name: &str) -> Result<Participant> {
        info!(code = %code, "joining session over REST");
        let req = JoinSessionRequest {
            code: code.to_string(),
            name: name.to_string(),
        };
        self.api.post(endpoints::SESSION_JOIN, &req).await
    }

    pub async fn get_session(&self, code: &str) -> Result<QuizSessionView> {
        self.api.get(&endpoints::session(code)).await
    }

    pub async fn results(&self, code: &str) -> Result<SessionResults> {
        self.api.get(&endpoints::session_results(code)).await
    }
}
