use crate::dto::notification_dto::PushTokenPayload;
use crate::error::Result;
use crate::models::notification::Notification;
use crate::services::api_client::ApiClient;
use crate::services::endpoints;
use reqwest::Method;
use serde_json::json;
use tracing::info;

#[derive(Clone)]
pub struct NotificationService {
    api: ApiClient,
}

impl NotificationService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<Notification>> {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum ListResponse {
            Wrapped { notifications: Vec<Notification> },
            Bare(Vec<Notification>),
        }
        let resp: ListResponse = self.api.get(endpoints::NOTIFICATIONS).await?;
        Ok(match resp {
            ListResponse::Wrapped { notifications } | ListResponse::Bare(notifications) => {
                notifications
            }
        })
    }

    pub async fn unread_count(&self) -> Result<usize> {
        Ok(self.list().await?.iter().filter(|n| !n.read).count())
    }

    pub async fn mark_read(&self, id: &str) -> Result<()> {
        self.api
            .send_empty(
                self.api
                    .request(Method::PATCH, &endpoints::notification_read(id))
                    .json(&json!({})),
            )
            .await
    }

    pub async fn mark_all_read(&self) -> Result<()> {
        self.api
            .send_empty(
                self.api
                    .request(Method::PATCH, endpoints::NOTIFICATIONS_READ_ALL)
                    .json(&json!({})),
            )
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        info!(notification_id = %id, "deleting notification");
        self.api.delete(&endpoints::notification(id)).await
    }

    /// Registers a device token with the push backend. Delivery is out of our hands.
    pub async fn register_push_token(&self, token: &str, platform: &str) -> Result<()> {
        let payload = PushTokenPayload {
            token: token.to_string(),
            platform: platform.to_string(),
        };
        self.api
            .send_empty(
                self.api
                    .request(Method::POST, endpoints::NOTIFICATIONS_PUSH_TOKEN)
                    .json(&payload),
            )
            .await
    }
}
