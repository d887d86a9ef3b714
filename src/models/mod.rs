pub mod dashboard;
pub mod media;
pub mod notification;
pub mod order;
pub mod question;
pub mod quiz;
pub mod session;
pub mod user;
