use crate::dto::generation_dto::{
    GenerateFromTextPayload, GenerateFromUrlPayload, GenerationResponse, GenerationSource,
};
use crate::error::{Error, Result};
use crate::models::quiz::Difficulty;
use crate::services::api_client::ApiClient;
use crate::services::endpoints;
use crate::utils::data_uri::{format_size, mime_from_path};
use crate::utils::validation::validate;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use std::path::Path;
use tracing::info;

/// Client for the quiz-generation backend. Generation itself happens remotely.
#[derive(Clone)]
pub struct GenerationService {
    api: ApiClient,
    max_upload_bytes: u64,
}

impl GenerationService {
    pub fn new(api: ApiClient, max_upload_bytes: u64) -> Self {
        Self {
            api,
            max_upload_bytes,
        }
    }

    pub async fn generate(
        &self,
        source: &GenerationSource,
        question_count: u32,
        difficulty: Difficulty,
    ) -> Result<GenerationResponse> {
        info!(source = source.label(), question_count, "requesting generated questions");
        let generated = match source {
            GenerationSource::Text(text) => {
                let payload = GenerateFromTextPayload {
                    text: text.trim().to_string(),
                    question_count,
                    difficulty,
                };
                validate(&payload)?;
                self.api.post(endpoints::GENERATE_TEXT, &payload).await?
            }
            GenerationSource::Url(url) => {
                let payload = GenerateFromUrlPayload {
                    url: url.trim().to_string(),
                    question_count,
                    difficulty,
                };
                validate(&payload)?;
                self.api.post(endpoints::GENERATE_URL, &payload).await?
            }
            GenerationSource::Pdf(path) => {
                self.upload(endpoints::GENERATE_PDF, path, "application/", question_count, difficulty)
                    .await?
            }
            GenerationSource::Image(path) => {
                self.upload(endpoints::GENERATE_IMAGE, path, "image/", question_count, difficulty)
                    .await?
            }
        };
        Ok(generated)
    }

    async fn upload(
        &self,
        endpoint: &str,
        path: &Path,
        mime_prefix: &str,
        question_count: u32,
        difficulty: Difficulty,
    ) -> Result<GenerationResponse> {
        let mime = mime_from_path(path)
            .filter(|m| m.starts_with(mime_prefix))
            .ok_or_else(|| {
                Error::BadRequest(format!("{} is not a supported file", path.display()))
            })?;

        let size = tokio::fs::metadata(path).await?.len();
        if size > self.max_upload_bytes {
            return Err(Error::BadRequest(format!(
                "File is too large (max {})",
                format_size(self.max_upload_bytes)
            )));
        }

        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let part = Part::bytes(bytes)
            .file_name(filename)
            .mime_str(mime)?;
        let difficulty = serde_json::to_value(difficulty)?
            .as_str()
            .unwrap_or("medium")
            .to_string();
        let form = Form::new()
            .part("file", part)
            .text("questionCount", question_count.to_string())
            .text("difficulty", difficulty);

        self.api
            .send(self.api.request(Method::POST, endpoint).multipart(form))
            .await
    }
}
