use crate::error::Result;
use crate::models::dashboard::DashboardData;
use crate::services::api_client::ApiClient;
use crate::services::endpoints;

#[derive(Clone)]
pub struct DashboardService {
    api: ApiClient,
}

impl DashboardService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn load(&self) -> Result<DashboardData> {
        self.api.get(endpoints::DASHBOARD).await
    }
}
