use crate::error::{Error, Result};
use crate::models::media::MediaKind;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::path::Path;

/// MIME type implied by a file's extension, the way a browser labels a picked file.
pub fn mime_from_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "m4a" => "audio/mp4",
        "aac" => "audio/aac",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "pdf" => "application/pdf",
        _ => return None,
    };
    Some(mime)
}

/// Human-readable size for limits: whole units print bare, others get one decimal.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    let (unit, name) = match bytes {
        b if b >= MB => (MB, "MB"),
        b if b >= KB => (KB, "KB"),
        _ => return format!("{} bytes", bytes),
    };
    if bytes % unit == 0 {
        format!("{} {}", bytes / unit, name)
    } else {
        format!("{:.1} {}", bytes as f64 / unit as f64, name)
    }
}

pub fn encode(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, BASE64.encode(bytes))
}

/// Reads a local file and encodes it, refusing anything outside `kind`'s MIME family.
pub async fn encode_file(path: &Path, kind: MediaKind, max_bytes: u64) -> Result<String> {
    let mime = mime_from_path(path).ok_or_else(|| {
        Error::Encoding(format!(
            "{} has an unsupported file type",
            path.display()
        ))
    })?;
    if !mime.starts_with(kind.mime_prefix()) {
        return Err(Error::Encoding(format!(
            "{} is not {} file ({})",
            path.display(),
            kind.with_article(),
            mime
        )));
    }

    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|e| Error::Encoding(format!("cannot read {}: {}", path.display(), e)))?;
    if meta.len() > max_bytes {
        return Err(Error::Encoding(format!(
            "{} is larger than {}",
            path.display(),
            format_size(max_bytes)
        )));
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| Error::Encoding(format!("cannot read {}: {}", path.display(), e)))?;
    let uri = encode(mime, &bytes);
    ensure_prefix(&uri, kind)?;
    Ok(uri)
}

/// Checks that an existing data URI belongs to `kind`'s MIME family.
pub fn ensure_prefix(uri: &str, kind: MediaKind) -> Result<()> {
    let expected = format!("data:{}", kind.mime_prefix());
    if uri.starts_with(&expected) {
        Ok(())
    } else {
        let shown: String = uri.chars().take(32).collect();
        Err(Error::Encoding(format!(
            "expected {} data, got {}",
            kind.label(),
            shown
        )))
    }
}
