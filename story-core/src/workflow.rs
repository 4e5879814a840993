//! Session workflow controller.
//!
//! The controller owns the live [`StoryState`] and the [`HistoryLog`] and is
//! the only thing that mutates them. Each user action is one method call;
//! generator calls are awaited in place, so a transition always runs to
//! completion before the next action is accepted.
//!
//! ```text
//!            generate                 continue
//!   Empty ──────────────▶ Ready ◀──────────────▶ (Continuing)
//!     ▲     (Generating)    │
//!     └──── start over ─────┘        select history: Empty/Ready ─▶ Ready
//! ```

use std::sync::Arc;

use chrono::Local;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::form::{Choice, FormSelections};
use crate::generator::{TextGenerator, FAILURE_MARKER, TOKEN_OVERHEAD};
use crate::prompts::{self, SETTING_TOKENS, TITLE_TOKENS};
use crate::story::{HistoryEntry, HistoryLog, StoryState, PARAGRAPH_SEPARATOR};

/// Errors from workflow actions. State is left untouched when one is returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("please fill in: {}", .0.join(", "))]
    IncompleteForm(Vec<&'static str>),

    #[error("there is no story to continue")]
    NoStory,

    #[error("no history entry numbered {0}")]
    UnknownHistoryEntry(usize),
}

/// Where the session is in the story lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No story.
    #[default]
    Empty,
    /// Story present, nothing pending.
    Ready,
    /// Initial generation in flight.
    Generating,
    /// Continuation in flight.
    Continuing,
}

impl Phase {
    pub fn is_busy(self) -> bool {
        matches!(self, Phase::Generating | Phase::Continuing)
    }
}

/// User actions the presentation layer can offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Generate,
    Continue,
    StartOver,
    SelectHistory,
    Speak,
    ExportPdf,
    ExportDocx,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A message for the user, queued by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// Everything one interactive session knows about its stories.
#[derive(Debug, Clone, Default)]
struct Session {
    story: StoryState,
    history: HistoryLog,
    phase: Phase,
}

impl Session {
    fn settle(&mut self) {
        self.phase = if self.story.is_empty() {
            Phase::Empty
        } else {
            Phase::Ready
        };
    }
}

/// The session workflow state machine.
pub struct Workflow {
    generator: Arc<dyn TextGenerator>,
    session: Session,
    notices: Vec<Notice>,
}

impl Workflow {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            session: Session::default(),
            notices: Vec::new(),
        }
    }

    pub fn story(&self) -> &StoryState {
        &self.session.story
    }

    pub fn history(&self) -> &HistoryLog {
        &self.session.history
    }

    pub fn phase(&self) -> Phase {
        self.session.phase
    }

    /// Take all queued notices, oldest first.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Actions that make sense in the current state.
    pub fn available_actions(&self) -> Vec<Action> {
        if self.session.phase.is_busy() {
            return Vec::new();
        }
        let mut actions = vec![Action::Generate];
        if !self.session.story.is_empty() {
            actions.extend([
                Action::Continue,
                Action::Speak,
                Action::ExportPdf,
                Action::ExportDocx,
            ]);
        }
        actions.push(Action::StartOver);
        if !self.session.history.is_empty() {
            actions.push(Action::SelectHistory);
        }
        actions
    }

    /// Generate a new story from the form: setting, first passage, title.
    ///
    /// Replaces any story on screen.
    pub async fn generate_initial(&mut self, form: &FormSelections) -> Result<(), WorkflowError> {
        let params = form.opening_params()?;
        let budget = params.length.token_budget();

        self.session.phase = Phase::Generating;
        self.session.story.awaiting_continuation = false;
        info!(genre = %params.genre, setting = %params.setting, length = %params.length, "generating story");

        let setting_description = self
            .call(&prompts::setting_prompt(&params), SETTING_TOKENS)
            .await;

        let generated = self
            .call(&prompts::opening_prompt(&params, &setting_description), budget)
            .await;
        let continuation = prompts::strip_opening_line(&generated, params.opening_line);
        let first_paragraph = if continuation.is_empty() {
            params.opening_line.to_string()
        } else {
            format!("{} {}", params.opening_line, continuation)
        };

        let body = format!(
            "{}{}{}",
            setting_description.trim(),
            PARAGRAPH_SEPARATOR,
            first_paragraph
        );

        let raw_title = self
            .call(&prompts::title_prompt(params.genre.label(), &body), TITLE_TOKENS)
            .await;
        let mut title = prompts::clean_title(&raw_title);
        if title.is_empty() {
            title = FAILURE_MARKER.to_string();
        }

        self.session.story = StoryState::new(title, body);
        self.session.settle();
        info!(title = %self.session.story.title, "story ready");
        Ok(())
    }

    /// Flag the current story for continuation (Ready -> Continuing).
    pub fn request_continue(&mut self) -> Result<(), WorkflowError> {
        if self.session.story.is_empty() {
            return Err(WorkflowError::NoStory);
        }
        self.session.story.awaiting_continuation = true;
        self.session.phase = Phase::Continuing;
        debug!("continuation requested");
        Ok(())
    }

    /// Run a pending continuation, if any (Continuing -> Ready).
    ///
    /// Returns `false` when nothing was pending.
    pub async fn process_pending(&mut self, form: &FormSelections) -> Result<bool, WorkflowError> {
        if !self.session.story.awaiting_continuation {
            return Ok(false);
        }

        let params = match form.continuation_params() {
            Ok(params) => params,
            Err(err) => {
                self.session.story.awaiting_continuation = false;
                self.session.settle();
                return Err(err);
            }
        };

        let prompt = prompts::continuation_prompt(&params, &self.session.story.body);
        let paragraph = self.call(&prompt, params.length.token_budget()).await;

        self.session.story.push_paragraph(&paragraph);
        self.session.story.awaiting_continuation = false;
        self.session.settle();
        info!(
            paragraphs = self.session.story.paragraphs().count(),
            "story continued"
        );
        Ok(true)
    }

    /// Append one paragraph to the current story.
    pub async fn continue_story(&mut self, form: &FormSelections) -> Result<(), WorkflowError> {
        let params = form.continuation_params()?;
        self.request_continue()?;
        debug!(length = %params.length, "processing continuation");
        self.process_pending(form).await.map(|_| ())
    }

    /// Archive the current story (if titled and new) and clear the screen.
    ///
    /// Returns `true` if a history entry was appended.
    pub fn start_over(&mut self, form: &FormSelections) -> bool {
        let story = &self.session.story;
        let archived = if !story.title.is_empty() && !story.body.is_empty() {
            let entry =
                HistoryEntry::new(&story.title, &story.body, form.genre_label(), Local::now());
            self.session.history.push_unique(entry)
        } else {
            false
        };

        if archived {
            info!(entries = self.session.history.len(), "story archived");
        } else if !story.body.is_empty() {
            debug!(title = %story.title, "story not archived (untitled or duplicate title)");
        }

        self.session.story.clear();
        self.session.settle();
        archived
    }

    /// Load a history entry by its 1-based label.
    pub fn select_history(&mut self, label: usize) -> Result<(), WorkflowError> {
        let entry = self
            .session
            .history
            .get(label)
            .ok_or(WorkflowError::UnknownHistoryEntry(label))?;

        self.session.story = StoryState::new(entry.title.clone(), entry.story.clone());
        self.session.settle();
        info!(label, title = %self.session.story.title, "history entry loaded");
        Ok(())
    }

    /// One generator call; failures become the failure marker plus a notice.
    async fn call(&mut self, prompt: &str, budget: usize) -> String {
        let max_tokens = budget + TOKEN_OVERHEAD;
        debug!(generator = self.generator.name(), max_tokens, "generator call");

        match self.generator.generate(prompt, max_tokens).await {
            Ok(text) => text.trim().to_string(),
            Err(err) => {
                warn!(error = %err, "generator call failed");
                self.notices
                    .push(Notice::error(format!("Story generation failed: {err}")));
                FAILURE_MARKER.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{Emotion, Genre, LengthTier, Mood, Setting};
    use crate::generator::GenerateError;
    use crate::testing::MockGenerator;

    fn form() -> FormSelections {
        FormSelections::new()
            .with_genre(Genre::Fantasy)
            .with_setting(Setting::Cafe)
            .with_mood(Mood::Mysterious)
            .with_emotion(Emotion::Nervous)
            .with_opening_line("Elena walked into the dim café.")
            .with_length(LengthTier::Short)
    }

    fn workflow(mock: &MockGenerator) -> Workflow {
        Workflow::new(Arc::new(mock.clone()))
    }

    #[tokio::test]
    async fn test_generate_builds_body_and_title() {
        let mock = MockGenerator::new(["Steam curls from cups.", "She sat down.", "\"The Dim Café\""]);
        let mut wf = workflow(&mock);

        wf.generate_initial(&form()).await.unwrap();

        assert_eq!(wf.phase(), Phase::Ready);
        assert_eq!(wf.story().title, "The Dim Café");
        assert_eq!(
            wf.story().body,
            "Steam curls from cups.\n\nElena walked into the dim café. She sat down."
        );

        let budgets: Vec<usize> = mock.calls().iter().map(|c| c.max_tokens).collect();
        assert_eq!(budgets, vec![130, 330, 60]);
    }

    #[tokio::test]
    async fn test_incomplete_form_leaves_state_alone() {
        let mock = MockGenerator::new(Vec::<String>::new());
        let mut wf = workflow(&mock);

        let err = wf
            .generate_initial(&form().with_opening_line("   "))
            .await
            .unwrap_err();
        assert_eq!(err, WorkflowError::IncompleteForm(vec!["opening line"]));
        assert_eq!(wf.phase(), Phase::Empty);
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failures_become_marker_and_notices() {
        let mock = MockGenerator::new(Vec::<String>::new());
        mock.push_failure(GenerateError::Transport("connection refused".into()));
        mock.push_reply("She ordered tea.");
        mock.push_failure(GenerateError::MalformedResponse("no choices".into()));
        let mut wf = workflow(&mock);

        wf.generate_initial(&form()).await.unwrap();

        assert_eq!(wf.phase(), Phase::Ready);
        assert_eq!(wf.story().title, FAILURE_MARKER);
        assert!(wf.story().body.starts_with("[ERROR]\n\n"));

        let notices = wf.drain_notices();
        assert_eq!(notices.len(), 2);
        assert!(notices.iter().all(Notice::is_error));
        assert!(wf.drain_notices().is_empty());
    }

    #[tokio::test]
    async fn test_continue_requires_story() {
        let mock = MockGenerator::new(Vec::<String>::new());
        let mut wf = workflow(&mock);
        assert_eq!(wf.continue_story(&form()).await, Err(WorkflowError::NoStory));
        assert_eq!(wf.request_continue(), Err(WorkflowError::NoStory));
    }

    #[tokio::test]
    async fn test_process_pending_without_flag_is_noop() {
        let mock = MockGenerator::new(["a", "b", "c"]);
        let mut wf = workflow(&mock);
        wf.generate_initial(&form()).await.unwrap();

        assert!(!wf.process_pending(&form()).await.unwrap());
        assert_eq!(mock.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_two_phase_continuation() {
        let mock = MockGenerator::new(["a", "b", "c", "More happened."]);
        let mut wf = workflow(&mock);
        wf.generate_initial(&form()).await.unwrap();

        wf.request_continue().unwrap();
        assert_eq!(wf.phase(), Phase::Continuing);
        assert!(wf.story().awaiting_continuation);
        assert!(wf.available_actions().is_empty());

        assert!(wf.process_pending(&form()).await.unwrap());
        assert_eq!(wf.phase(), Phase::Ready);
        assert!(!wf.story().awaiting_continuation);
        assert!(wf.story().body.ends_with("\n\nMore happened."));
    }

    #[tokio::test]
    async fn test_pending_with_bad_form_clears_flag() {
        let mock = MockGenerator::new(["a", "b", "c"]);
        let mut wf = workflow(&mock);
        wf.generate_initial(&form()).await.unwrap();

        wf.request_continue().unwrap();
        let mut bad = form();
        bad.mood = None;
        assert!(wf.process_pending(&bad).await.is_err());
        assert_eq!(wf.phase(), Phase::Ready);
        assert!(!wf.story().awaiting_continuation);
    }

    #[tokio::test]
    async fn test_start_over_from_empty_archives_nothing() {
        let mock = MockGenerator::new(Vec::<String>::new());
        let mut wf = workflow(&mock);
        assert!(!wf.start_over(&form()));
        assert!(wf.history().is_empty());
        assert_eq!(wf.phase(), Phase::Empty);
    }

    #[tokio::test]
    async fn test_select_history_unknown_label() {
        let mock = MockGenerator::new(Vec::<String>::new());
        let mut wf = workflow(&mock);
        assert_eq!(
            wf.select_history(1),
            Err(WorkflowError::UnknownHistoryEntry(1))
        );
    }

    #[tokio::test]
    async fn test_available_actions() {
        let mock = MockGenerator::new(["a", "b", "T"]);
        let mut wf = workflow(&mock);
        assert_eq!(wf.available_actions(), vec![Action::Generate, Action::StartOver]);

        wf.generate_initial(&form()).await.unwrap();
        assert!(wf.available_actions().contains(&Action::Continue));
        assert!(!wf.available_actions().contains(&Action::SelectHistory));

        wf.start_over(&form());
        assert_eq!(
            wf.available_actions(),
            vec![Action::Generate, Action::StartOver, Action::SelectHistory]
        );
    }
}
