use crate::dto::generation_dto::{GenerationSource, MIN_SOURCE_TEXT_CHARS, SOURCE_TEXT_TOO_SHORT};
use crate::error::{Error, Result};
use crate::models::question::{CorrectAnswer, QuestionDraft, QuestionType};
use crate::models::quiz::{QuizDraft, QuizSettings};
use crate::utils::data_uri::mime_from_path;

pub const TITLE_REQUIRED: &str = "Please enter a quiz title.";
pub const SUBJECT_REQUIRED: &str = "Please enter a subject.";
pub const QUESTIONS_REQUIRED: &str = "Please add at least one question.";

pub fn validate_source(source: &GenerationSource) -> Result<()> {
    match source {
        GenerationSource::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Err(Error::Draft(
                    "Please paste some text to generate questions from.".into(),
                ));
            }
            if text.chars().count() < MIN_SOURCE_TEXT_CHARS {
                return Err(Error::Draft(SOURCE_TEXT_TOO_SHORT.into()));
            }
        }
        GenerationSource::Url(raw) => {
            let ok = url::Url::parse(raw.trim())
                .map(|u| matches!(u.scheme(), "http" | "https"))
                .unwrap_or(false);
            if !ok {
                return Err(Error::Draft("Please enter a valid URL.".into()));
            }
        }
        GenerationSource::Pdf(path) => {
            if !path.is_file() || mime_from_path(path) != Some("application/pdf") {
                return Err(Error::Draft("Please select a PDF file.".into()));
            }
        }
        GenerationSource::Image(path) => {
            let is_image = mime_from_path(path).is_some_and(|m| m.starts_with("image/"));
            if !path.is_file() || !is_image {
                return Err(Error::Draft("Please select an image file.".into()));
            }
        }
    }
    Ok(())
}

pub fn validate_basic_info(draft: &QuizDraft) -> Result<()> {
    if draft.title.trim().is_empty() {
        return Err(Error::Draft(TITLE_REQUIRED.into()));
    }
    if draft.subject.trim().is_empty() {
        return Err(Error::Draft(SUBJECT_REQUIRED.into()));
    }
    Ok(())
}

pub fn validate_has_questions(draft: &QuizDraft) -> Result<()> {
    if draft.questions.is_empty() {
        return Err(Error::Draft(QUESTIONS_REQUIRED.into()));
    }
    Ok(())
}

/// Checks one question; `index` is zero-based, messages count from one.
pub fn validate_question(index: usize, q: &QuestionDraft) -> Result<()> {
    let n = index + 1;
    if q.question.trim().is_empty() {
        return Err(Error::Draft(format!(
            "Question {}: please enter the question text.",
            n
        )));
    }

    match q.question_type {
        QuestionType::MultipleChoice => {
            if q.options.is_empty() {
                return Err(Error::Draft(format!(
                    "Question {}: please add at least one option.",
                    n
                )));
            }
            if let Some(pos) = q.options.iter().position(|o| !o.has_content()) {
                return Err(Error::Draft(format!(
                    "Question {}: option {} needs text or an image.",
                    n,
                    pos + 1
                )));
            }
            let in_bounds = matches!(
                q.correct_answer,
                Some(CorrectAnswer::Index(i)) if i >= 0 && (i as usize) < q.options.len()
            );
            if !in_bounds {
                return Err(Error::Draft(format!(
                    "Question {}: please select a valid correct option.",
                    n
                )));
            }
        }
        QuestionType::TrueFalse => {
            if !matches!(q.correct_answer, Some(CorrectAnswer::Bool(_))) {
                return Err(Error::Draft(format!(
                    "Question {}: please choose True or False as the answer.",
                    n
                )));
            }
        }
        QuestionType::ShortAnswer | QuestionType::FillInTheBlank => {
            let has_text = matches!(
                q.correct_answer,
                Some(CorrectAnswer::Text(ref t)) if !t.trim().is_empty()
            );
            if !has_text {
                return Err(Error::Draft(format!(
                    "Question {}: please enter the correct answer.",
                    n
                )));
            }
        }
    }
    Ok(())
}

pub fn validate_settings(settings: &QuizSettings) -> Result<()> {
    if settings.time_limit_minutes == Some(0) {
        return Err(Error::Draft("Time limit must be at least 1 minute.".into()));
    }
    if settings.question_timer_seconds == Some(0) {
        return Err(Error::Draft(
            "Question timer must be at least 1 second.".into(),
        ));
    }
    if settings.max_attempts == Some(0) {
        return Err(Error::Draft("Attempt limit must be at least 1.".into()));
    }
    Ok(())
}

/// Every rule a draft must satisfy before it may be published.
pub fn validate_for_publish(draft: &QuizDraft) -> Result<()> {
    validate_basic_info(draft)?;
    validate_has_questions(draft)?;
    for (i, q) in draft.questions.iter().enumerate() {
        validate_question(i, q)?;
    }
    validate_settings(&draft.settings)
}
