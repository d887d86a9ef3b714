use crate::dto::auth_dto::{
    ForgotPasswordPayload, LoginPayload, MessageResponse, ResetPasswordPayload, SignupPayload,
};
use crate::error::Result;
use crate::models::user::{AuthSession, User};
use crate::services::api_client::ApiClient;
use crate::services::endpoints;
use crate::utils::validation::validate;
use serde_json::json;
use tracing::info;

#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn signup(&self, payload: &SignupPayload) -> Result<AuthSession> {
        validate(payload)?;
        let session: AuthSession = self.api.post(endpoints::AUTH_SIGNUP, payload).await?;
        self.api.set_token(Some(session.token.clone()));
        info!(user_id = %session.user.id, "signed up");
        Ok(session)
    }

    pub async fn login(&self, payload: &LoginPayload) -> Result<AuthSession> {
        validate(payload)?;
        let session: AuthSession = self.api.post(endpoints::AUTH_LOGIN, payload).await?;
        self.api.set_token(Some(session.token.clone()));
        info!(user_id = %session.user.id, "logged in");
        Ok(session)
    }

    /// Tells the server to end the session; the local token is dropped either way.
    pub async fn logout(&self) -> Result<()> {
        let result = self
            .api
            .send_empty(
                self.api
                    .request(reqwest::Method::POST, endpoints::AUTH_LOGOUT)
                    .json(&json!({})),
            )
            .await;
        self.api.set_token(None);
        result
    }

    pub async fn forgot_password(&self, payload: &ForgotPasswordPayload) -> Result<String> {
        validate(payload)?;
        let resp: MessageResponse = self.api.post(endpoints::AUTH_FORGOT_PASSWORD, payload).await?;
        Ok(resp.message)
    }

    pub async fn reset_password(&self, token: &str, payload: &ResetPasswordPayload) -> Result<String> {
        validate(payload)?;
        let resp: MessageResponse = self
            .api
            .post(&endpoints::reset_password(token), payload)
            .await?;
        Ok(resp.message)
    }

    pub async fn me(&self) -> Result<User> {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum MeResponse {
            Wrapped { user: User },
            Bare(User),
        }
        let resp: MeResponse = self.api.get(endpoints::AUTH_ME).await?;
        Ok(match resp {
            MeResponse::Wrapped { user } | MeResponse::Bare(user) => user,
        })
    }
}
