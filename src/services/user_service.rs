use crate::dto::auth_dto::UpdateProfilePayload;
use crate::error::Result;
use crate::models::user::{ActivityEntry, User};
use crate::services::api_client::ApiClient;
use crate::services::endpoints;
use crate::utils::validation::validate;

#[derive(Clone)]
pub struct UserService {
    api: ApiClient,
}

impl UserService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn activity(&self) -> Result<Vec<ActivityEntry>> {
        self.api.get(endpoints::USER_ACTIVITY).await
    }

    pub async fn update_profile(&self, payload: &UpdateProfilePayload) -> Result<User> {
        validate(payload)?;
        self.api.patch(endpoints::USER_PROFILE, payload).await
    }
}
