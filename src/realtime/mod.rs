//! Live-session join flow over the session service's real-time channel.

pub mod channel;
pub mod join_flow;
