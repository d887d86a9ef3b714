pub mod config;
pub mod dto;
pub mod error;
pub mod models;
pub mod realtime;
pub mod services;
pub mod store;
pub mod utils;
pub mod wizard;

use crate::config::Config;
use crate::error::Result;
use crate::realtime::channel::WsConnector;
use crate::realtime::join_flow::JoinFlow;
use crate::services::{
    api_client::ApiClient, auth_service::AuthService, dashboard_service::DashboardService,
    generation_service::GenerationService, media_service::MediaService,
    notification_service::NotificationService, order_service::OrderService,
    quiz_service::QuizService, session_service::SessionService, user_service::UserService,
};

/// Every remote collaborator, sharing one HTTP connection pool and one token.
#[derive(Clone)]
pub struct QuizClient {
    pub config: Config,
    pub api: ApiClient,
    pub auth_service: AuthService,
    pub quiz_service: QuizService,
    pub generation_service: GenerationService,
    pub session_service: SessionService,
    pub notification_service: NotificationService,
    pub dashboard_service: DashboardService,
    pub order_service: OrderService,
    pub user_service: UserService,
    pub media_service: MediaService,
}

impl QuizClient {
    pub fn new(config: Config) -> Result<Self> {
        let api = ApiClient::new(&config)?;

        let auth_service = AuthService::new(api.clone());
        let quiz_service = QuizService::new(api.clone());
        let generation_service = GenerationService::new(api.clone(), config.max_upload_bytes());
        let session_service = SessionService::new(api.clone());
        let notification_service = NotificationService::new(api.clone());
        let dashboard_service = DashboardService::new(api.clone());
        let order_service = OrderService::new(api.clone());
        let user_service = UserService::new(api.clone());
        let media_service = MediaService::new(&config, api.http().clone());

        Ok(Self {
            config,
            api,
            auth_service,
            quiz_service,
            generation_service,
            session_service,
            notification_service,
            dashboard_service,
            order_service,
            user_service,
            media_service,
        })
    }

    pub fn set_token(&self, token: Option<String>) {
        self.api.set_token(token);
    }

    /// A join flow wired to the configured socket endpoint.
    pub fn join_flow(&self) -> JoinFlow<WsConnector, SessionService> {
        JoinFlow::new(
            WsConnector::new(self.config.socket_url.clone()),
            self.session_service.clone(),
            self.config.join_timeout(),
        )
    }
}
