use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushTokenPayload {
    pub token: String,
    pub platform: String,
}
