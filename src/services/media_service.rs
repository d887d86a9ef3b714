use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::media::MediaHit;
use anyhow::Context as _;
use reqwest::Client;
use tracing::info;

/// Stock image and GIF search, called straight from the client with its own keys.
#[derive(Clone)]
pub struct MediaService {
    client: Client,
    pixabay_key: Option<String>,
    giphy_key: Option<String>,
    pixabay_url: String,
    giphy_url: String,
}

impl MediaService {
    pub fn new(config: &Config, client: Client) -> Self {
        let service = Self {
            client,
            pixabay_key: config.pixabay_api_key.clone(),
            giphy_key: config.giphy_api_key.clone(),
            pixabay_url: config.pixabay_base_url.clone(),
            giphy_url: config.giphy_base_url.clone(),
        };
        if service.pixabay_key.is_none() {
            info!("image search disabled (PIXABAY_API_KEY not set)");
        }
        if service.giphy_key.is_none() {
            info!("GIF search disabled (GIPHY_API_KEY not set)");
        }
        service
    }

    pub async fn search_images(&self, query: &str, limit: u32) -> Result<Vec<MediaHit>> {
        #[derive(serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Hit {
            webformat_url: String,
            preview_url: String,
            #[serde(default)]
            tags: String,
        }
        #[derive(serde::Deserialize)]
        struct PixabayResp {
            hits: Vec<Hit>,
        }

        let key = self
            .pixabay_key
            .as_deref()
            .ok_or_else(|| Error::Config("Image search is not configured".to_string()))?;
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        // Pixabay only accepts 3..=200 per page
        let per_page = limit.clamp(3, 200).to_string();
        let resp = self
            .client
            .get(&self.pixabay_url)
            .query(&[
                ("key", key),
                ("q", query),
                ("image_type", "photo"),
                ("safesearch", "true"),
                ("per_page", per_page.as_str()),
            ])
            .send()
            .await
            .context("image search request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(Error::from_response(status, &txt));
        }
        let txt = resp.text().await.context("image search response could not be read")?;
        let parsed: PixabayResp = serde_json::from_str(&txt).context("image search parse failed")?;
        Ok(parsed
            .hits
            .into_iter()
            .take(limit as usize)
            .map(|h| MediaHit {
                url: h.webformat_url,
                preview_url: h.preview_url,
                title: h.tags,
            })
            .collect())
    }

    pub async fn search_gifs(&self, query: &str, limit: u32) -> Result<Vec<MediaHit>> {
        #[derive(serde::Deserialize)]
        struct Rendition {
            url: String,
        }
        #[derive(serde::Deserialize)]
        struct Images {
            fixed_height: Rendition,
            fixed_height_small: Option<Rendition>,
        }
        #[derive(serde::Deserialize)]
        struct Gif {
            #[serde(default)]
            title: String,
            images: Images,
        }
        #[derive(serde::Deserialize)]
        struct GiphyResp {
            data: Vec<Gif>,
        }

        let key = self
            .giphy_key
            .as_deref()
            .ok_or_else(|| Error::Config("GIF search is not configured".to_string()))?;
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let limit_param = limit.clamp(1, 50).to_string();
        let resp = self
            .client
            .get(&self.giphy_url)
            .query(&[
                ("api_key", key),
                ("q", query),
                ("limit", limit_param.as_str()),
                ("rating", "g"),
            ])
            .send()
            .await
            .context("gif search request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(Error::from_response(status, &txt));
        }
        let txt = resp.text().await.context("gif search response could not be read")?;
        let parsed: GiphyResp = serde_json::from_str(&txt).context("gif search parse failed")?;
        Ok(parsed
            .data
            .into_iter()
            .map(|g| {
                let preview = g
                    .images
                    .fixed_height_small
                    .map(|r| r.url)
                    .unwrap_or_else(|| g.images.fixed_height.url.clone());
                MediaHit {
                    url: g.images.fixed_height.url,
                    preview_url: preview,
                    title: g.title,
                }
            })
            .collect())
    }
}
