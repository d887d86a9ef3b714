use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

pub const DEFAULT_PIXABAY_BASE_URL: &str = "https://pixabay.com/api/";
pub const DEFAULT_GIPHY_BASE_URL: &str = "https://api.giphy.com/v1/gifs/search";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub socket_url: String,
    pub request_timeout_secs: u64,
    pub join_timeout_secs: u64,
    pub max_upload_mb: u64,
    pub session_file: PathBuf,
    pub pixabay_api_key: Option<String>,
    pub giphy_api_key: Option<String>,
    pub pixabay_base_url: String,
    pub giphy_base_url: String,
    pub log_format: LogFormat,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let log_format = match get_env_or("LOG_FORMAT", "text").to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "text" => LogFormat::Text,
            other => {
                return Err(Error::Config(format!(
                    "Invalid value for LOG_FORMAT: {} (expected text or json)",
                    other
                )))
            }
        };

        Ok(Self {
            api_base_url: normalize_base_url(&get_env("API_BASE_URL")?)?,
            socket_url: get_env("SOCKET_URL")?,
            request_timeout_secs: get_env_parse_or("REQUEST_TIMEOUT_SECS", 60)?,
            join_timeout_secs: get_env_parse_or("JOIN_TIMEOUT_SECS", 15)?,
            max_upload_mb: get_env_parse_or("MAX_UPLOAD_MB", 10)?,
            session_file: PathBuf::from(get_env_or("SESSION_FILE", ".quizcraft/session.json")),
            pixabay_api_key: get_optional_env("PIXABAY_API_KEY"),
            giphy_api_key: get_optional_env("GIPHY_API_KEY"),
            pixabay_base_url: get_env_or("PIXABAY_BASE_URL", DEFAULT_PIXABAY_BASE_URL),
            giphy_base_url: get_env_or("GIPHY_BASE_URL", DEFAULT_GIPHY_BASE_URL),
            log_format,
        })
    }

    /// Configuration pointing every remote collaborator at one host, with defaults elsewhere.
    pub fn for_base_url(api_base_url: &str, socket_url: &str) -> Self {
        Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            socket_url: socket_url.to_string(),
            request_timeout_secs: 60,
            join_timeout_secs: 15,
            max_upload_mb: 10,
            session_file: PathBuf::from(".quizcraft/session.json"),
            pixabay_api_key: None,
            giphy_api_key: None,
            pixabay_base_url: DEFAULT_PIXABAY_BASE_URL.to_string(),
            giphy_base_url: DEFAULT_GIPHY_BASE_URL.to_string(),
            log_format: LogFormat::Text,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn join_timeout(&self) -> Duration {
        Duration::from_secs(self.join_timeout_secs)
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| Error::Config(format!("Invalid value for API_BASE_URL: {}", e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "API_BASE_URL must use http or https, got {}",
            parsed.scheme()
        )));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_optional_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or(name: &str, default: &str) -> String {
    get_optional_env(name).unwrap_or_else(|| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_optional_env(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        None => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> Result<&'static Config> {
    CONFIG
        .get()
        .ok_or_else(|| Error::Config("Configuration has not been initialized".to_string()))
}
