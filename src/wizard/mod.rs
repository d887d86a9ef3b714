//! Quiz-creation wizard: step gating and one-shot submission.

pub mod encoder;
pub mod validation;

use crate::dto::generation_dto::{GenerationResponse, GenerationSource};
use crate::error::{Error, Result};
use crate::models::question::QuestionDraft;
use crate::models::quiz::{Quiz, QuizDraft};
use crate::services::quiz_service::QuizService;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    SourceSelection,
    BasicInfo,
    Questions,
    Settings,
    Publish,
}

impl WizardStep {
    pub fn next(self) -> Option<Self> {
        match self {
            WizardStep::SourceSelection => Some(WizardStep::BasicInfo),
            WizardStep::BasicInfo => Some(WizardStep::Questions),
            WizardStep::Questions => Some(WizardStep::Settings),
            WizardStep::Settings => Some(WizardStep::Publish),
            WizardStep::Publish => None,
        }
    }

    pub fn prev(self) -> Option<Self> {
        match self {
            WizardStep::SourceSelection => None,
            WizardStep::BasicInfo => Some(WizardStep::SourceSelection),
            WizardStep::Questions => Some(WizardStep::BasicInfo),
            WizardStep::Settings => Some(WizardStep::Questions),
            WizardStep::Publish => Some(WizardStep::Settings),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::SourceSelection => "Source",
            WizardStep::BasicInfo => "Basic info",
            WizardStep::Questions => "Questions",
            WizardStep::Settings => "Settings",
            WizardStep::Publish => "Publish",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreationMode {
    Manual,
    Ai(GenerationSource),
}

#[derive(Debug, Clone)]
pub struct QuizWizard {
    step: WizardStep,
    mode: CreationMode,
    draft: QuizDraft,
    error: Option<String>,
}

impl QuizWizard {
    pub fn new(mode: CreationMode) -> Self {
        Self::with_draft(mode, QuizDraft::default())
    }

    pub fn with_draft(mode: CreationMode, draft: QuizDraft) -> Self {
        Self {
            step: WizardStep::SourceSelection,
            mode,
            draft,
            error: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn mode(&self) -> &CreationMode {
        &self.mode
    }

    pub fn draft(&self) -> &QuizDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut QuizDraft {
        &mut self.draft
    }

    /// Message from the last blocked action, if it has not been cleared.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// The source can only change before leaving the first step.
    pub fn set_mode(&mut self, mode: CreationMode) -> Result<()> {
        if self.step != WizardStep::SourceSelection {
            return self.block(Error::Draft(
                "Go back to the first step to change how the quiz is created.".into(),
            ));
        }
        self.mode = mode;
        Ok(())
    }

    pub fn add_question(&mut self, question: QuestionDraft) {
        self.draft.questions.push(question);
    }

    pub fn remove_question(&mut self, index: usize) -> Option<QuestionDraft> {
        (index < self.draft.questions.len()).then(|| self.draft.questions.remove(index))
    }

    /// Appends generated questions and fills title/subject only where the user left them blank.
    pub fn apply_generated(&mut self, generated: GenerationResponse) {
        if self.draft.title.trim().is_empty() {
            if let Some(title) = generated.title {
                self.draft.title = title;
            }
        }
        if self.draft.subject.trim().is_empty() {
            if let Some(subject) = generated.subject {
                self.draft.subject = subject;
            }
        }
        info!(count = generated.questions.len(), "generated questions added to draft");
        self.draft.questions.extend(generated.questions);
    }

    /// Minimum data the current step needs before moving forward.
    pub fn gate(&self) -> Result<()> {
        match self.step {
            WizardStep::SourceSelection => match &self.mode {
                CreationMode::Manual => Ok(()),
                CreationMode::Ai(source) => validation::validate_source(source),
            },
            WizardStep::BasicInfo => validation::validate_basic_info(&self.draft),
            WizardStep::Questions => validation::validate_has_questions(&self.draft),
            WizardStep::Settings | WizardStep::Publish => {
                validation::validate_for_publish(&self.draft)
            }
        }
    }

    pub fn next_step(&mut self) -> Result<WizardStep> {
        if let Err(err) = self.gate() {
            return self.block(err);
        }
        let Some(next) = self.step.next() else {
            return self.block(Error::Draft("This is the last step.".into()));
        };
        self.error = None;
        self.step = next;
        Ok(next)
    }

    pub fn prev_step(&mut self) -> WizardStep {
        if let Some(prev) = self.step.prev() {
            self.step = prev;
        }
        self.error = None;
        self.step
    }

    /// Runs every step's gate in order, as if the user clicked through.
    pub fn ensure_ready(&self) -> Result<()> {
        if let CreationMode::Ai(source) = &self.mode {
            if self.draft.questions.is_empty() {
                validation::validate_source(source)?;
            }
        }
        validation::validate_for_publish(&self.draft)
    }

    /// Validates, encodes and sends the draft once. On any failure nothing is
    /// sent and the draft stays as it was so the user can fix it and resubmit.
    pub async fn submit(&mut self, quizzes: &QuizService, max_upload_bytes: u64) -> Result<Quiz> {
        if let Err(err) = self.ensure_ready() {
            return self.block(err);
        }
        let payload = match encoder::encode_draft(&self.draft, max_upload_bytes).await {
            Ok(payload) => payload,
            Err(err) => return self.block(err),
        };
        match quizzes.create_quiz(&payload).await {
            Ok(quiz) => {
                info!(quiz_id = %quiz.id, "quiz published");
                self.draft = QuizDraft::default();
                self.step = WizardStep::SourceSelection;
                self.error = None;
                Ok(quiz)
            }
            Err(err) => self.block(err),
        }
    }

    fn block<T>(&mut self, err: Error) -> Result<T> {
        warn!(step = self.step.title(), error = %err, "wizard action blocked");
        self.error = Some(err.user_message());
        Err(err)
    }
}
