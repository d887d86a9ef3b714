pub mod auth_dto;
pub mod generation_dto;
pub mod notification_dto;
pub mod order_dto;
pub mod quiz_dto;
pub mod session_dto;
