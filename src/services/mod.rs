pub mod api_client;
pub mod auth_service;
pub mod dashboard_service;
pub mod endpoints;
pub mod export_service;
pub mod generation_service;
pub mod media_service;
pub mod notification_service;
pub mod order_service;
pub mod quiz_service;
pub mod results_service;
pub mod session_service;
pub mod user_service;
