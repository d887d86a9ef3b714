pub const AUTH_SIGNUP: &str = "/api/auth/signup";
pub const AUTH_LOGIN: &str = "/api/auth/login";
pub const AUTH_LOGOUT: &str = "/api/auth/logout";
pub const AUTH_FORGOT_PASSWORD: &str = "/api/auth/forgot-password";
pub const AUTH_ME: &str = "/api/auth/me";

pub const QUIZZES: &str = "/api/quizzes";

pub const GENERATE_PDF: &str = "/api/generate/pdf";
pub const GENERATE_IMAGE: &str = "/api/generate/image";
pub const GENERATE_TEXT: &str = "/api/generate/text";
pub const GENERATE_URL: &str = "/api/generate/url";

pub const SESSION_VERIFY: &str = "/api/quiz-sessions/verify";
pub const SESSION_JOIN: &str = "/api/quiz-sessions/join";

pub const NOTIFICATIONS: &str = "/api/notifications";
pub const NOTIFICATIONS_READ_ALL: &str = "/api/notifications/read-all";
pub const NOTIFICATIONS_PUSH_TOKEN: &str = "/api/notifications/push-token";

pub const DASHBOARD: &str = "/api/dashboard";

pub const ORDERS: &str = "/api/orders";
pub const ORDERS_VALIDATE: &str = "/api/orders/validate";

pub const USER_ACTIVITY: &str = "/api/users/activity";
pub const USER_PROFILE: &str = "/api/users/profile";

pub fn reset_password(token: &str) -> String {
    format!("/api/auth/reset-password/{}", encode_segment(token))
}

pub fn quiz(id: &str) -> String {
    format!("{}/{}", QUIZZES, encode_segment(id))
}

pub fn session(code: &str) -> String {
    format!("/api/quiz-sessions/{}", encode_segment(code))
}

pub fn session_results(code: &str) -> String {
    format!("{}/results", session(code))
}

pub fn notification(id: &str) -> String {
    format!("{}/{}", NOTIFICATIONS, encode_segment(id))
}

pub fn notification_read(id: &str) -> String {
    format!("{}/read", notification(id))
}

/// Percent-encodes a single path segment.
fn encode_segment(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
