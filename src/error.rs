use reqwest::StatusCode;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Wizard and draft rule violations. The message is shown to the user as is.
    #[error("{0}")]
    Draft(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Excel export error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

impl Error {
    /// Maps a non-success response to an error, preferring the body's own message.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .or_else(|| v.get("error"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("Request failed")
                        .to_string()
                } else {
                    trimmed.to_string()
                }
            });

        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Error::BadRequest(message),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Unauthorized(message),
            StatusCode::NOT_FOUND => Error::NotFound(message),
            other => Error::Api {
                status: other.as_u16(),
                message,
            },
        }
    }

    /// Text for the transient toast/banner shown when an operation stops.
    pub fn user_message(&self) -> String {
        match self {
            Error::Draft(msg) => msg.clone(),
            Error::BadRequest(msg) | Error::NotFound(msg) | Error::Session(msg) => msg.clone(),
            Error::Unauthorized(_) => "Your session has expired. Please log in again.".to_string(),
            Error::Validation(err) => err.to_string(),
            Error::Encoding(msg) => format!("Could not prepare your files: {}", msg),
            Error::Api { message, .. } => message.clone(),
            Error::Reqwest(err) if err.is_timeout() => {
                "The server took too long to respond. Please try again.".to_string()
            }
            Error::Reqwest(_) | Error::WebSocket(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            Error::Config(msg) => msg.clone(),
            _ => "An unexpected error occurred".to_string(),
        }
    }
}
