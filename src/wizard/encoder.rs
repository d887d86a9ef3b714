use crate::dto::quiz_dto::{
    CreateQuestionPayload, CreateQuizPayload, EncodedContent, EncodedOption,
};
use crate::error::{Error, Result};
use crate::models::media::{MediaKind, MediaRef};
use crate::models::question::{ContentItem, QuestionDraft, QuestionOption};
use crate::models::quiz::QuizDraft;
use crate::utils::data_uri;
use tracing::debug;

/// Turns an in-memory media reference into something the API accepts.
/// Remote URLs are never re-encoded.
pub async fn encode_media(media: &MediaRef, kind: MediaKind, max_bytes: u64) -> Result<String> {
    match media {
        MediaRef::Remote(url) => Ok(url.clone()),
        MediaRef::DataUri(uri) => {
            data_uri::ensure_prefix(uri, kind)?;
            Ok(uri.clone())
        }
        MediaRef::LocalFile(path) => {
            debug!(path = %path.display(), kind = kind.label(), "encoding local file");
            data_uri::encode_file(path, kind, max_bytes).await
        }
    }
}

/// Builds the complete creation payload or fails as a whole.
pub async fn encode_draft(draft: &QuizDraft, max_bytes: u64) -> Result<CreateQuizPayload> {
    let cover_image = match &draft.cover_image {
        Some(media) if !media.is_empty() => {
            Some(encode_media(media, MediaKind::Image, max_bytes).await?)
        }
        _ => None,
    };

    let mut questions = Vec::with_capacity(draft.questions.len());
    for (i, q) in draft.questions.iter().enumerate() {
        questions.push(encode_question(i, q, max_bytes).await?);
    }

    Ok(CreateQuizPayload {
        title: draft.title.trim().to_string(),
        description: draft.description.trim().to_string(),
        subject: draft.subject.trim().to_string(),
        difficulty: draft.difficulty,
        questions,
        cover_image,
        settings: draft.settings.clone(),
    })
}

async fn encode_question(
    index: usize,
    q: &QuestionDraft,
    max_bytes: u64,
) -> Result<CreateQuestionPayload> {
    let correct_answer = q.correct_answer.clone().ok_or_else(|| {
        Error::Draft(format!("Question {}: missing correct answer.", index + 1))
    })?;

    let mut content = Vec::with_capacity(q.content.len());
    for item in &q.content {
        let encoded = match item {
            ContentItem::Text { text } => EncodedContent::Text { text: text.clone() },
            ContentItem::Image { src } => EncodedContent::Image {
                src: encode_media(src, MediaKind::Image, max_bytes).await?,
            },
            ContentItem::Audio { src } => EncodedContent::Audio {
                src: encode_media(src, MediaKind::Audio, max_bytes).await?,
            },
            ContentItem::Video { src } => EncodedContent::Video {
                src: encode_media(src, MediaKind::Video, max_bytes).await?,
            },
        };
        content.push(encoded);
    }

    let mut options = Vec::with_capacity(q.options.len());
    for opt in &q.options {
        let encoded = match opt {
            QuestionOption::Text(text) => EncodedOption::Text(text.trim().to_string()),
            QuestionOption::Image(image_opt) => {
                let image = match &image_opt.image {
                    Some(media) if !media.is_empty() => {
                        Some(encode_media(media, MediaKind::Image, max_bytes).await?)
                    }
                    _ => None,
                };
                EncodedOption::Image {
                    text: image_opt
                        .text
                        .as_deref()
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(str::to_string),
                    image,
                }
            }
        };
        options.push(encoded);
    }

    Ok(CreateQuestionPayload {
        question_type: q.question_type,
        question: q.question.trim().to_string(),
        content,
        options,
        correct_answer,
        explanation: q
            .explanation
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string),
        points: q.points,
    })
}
