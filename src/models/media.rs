use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where a piece of media in a draft currently lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MediaRef {
    /// Already encoded, e.g. restored from a previous draft.
    DataUri(String),
    /// Hosted elsewhere, typically picked from an image/GIF search.
    Remote(String),
    /// Selected from the local filesystem, not yet encoded.
    LocalFile(PathBuf),
}

impl MediaRef {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with("data:") {
            MediaRef::DataUri(trimmed.to_string())
        } else if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            MediaRef::Remote(trimmed.to_string())
        } else {
            MediaRef::LocalFile(PathBuf::from(trimmed))
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            MediaRef::DataUri(s) | MediaRef::Remote(s) => s.trim().is_empty(),
            MediaRef::LocalFile(p) => p.as_os_str().is_empty(),
        }
    }
}

impl From<String> for MediaRef {
    fn from(raw: String) -> Self {
        MediaRef::parse(&raw)
    }
}

impl From<MediaRef> for String {
    fn from(media: MediaRef) -> Self {
        match media {
            MediaRef::DataUri(s) | MediaRef::Remote(s) => s,
            MediaRef::LocalFile(p) => p.to_string_lossy().into_owned(),
        }
    }
}

/// The slot a piece of media fills, which fixes the MIME family it must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Audio,
    Video,
}

impl MediaKind {
    pub fn mime_prefix(self) -> &'static str {
        match self {
            MediaKind::Image => "image/",
            MediaKind::Audio => "audio/",
            MediaKind::Video => "video/",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
        }
    }

    /// The label with its indefinite article, for "is not an image file".
    pub fn with_article(self) -> &'static str {
        match self {
            MediaKind::Image => "an image",
            MediaKind::Audio => "an audio",
            MediaKind::Video => "a video",
        }
    }
}

/// One result from a stock image or GIF search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaHit {
    pub url: String,
    pub preview_url: String,
    pub title: String,
}
