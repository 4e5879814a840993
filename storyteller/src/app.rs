//! Main application state and logic

use story_core::{
    Action, Artifact, Choice, Emotion, Genre, Mood, Notice, Phase, SessionError, Setting,
    StorySession,
};
use tracing::warn;

use crate::ui::theme::StoryTheme;
use crate::ui::{FocusedPanel, Overlay};

/// Vim-style input modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Normal mode - navigation and hotkeys (default)
    #[default]
    Normal,
    /// Insert mode - editing a text field
    Insert,
}

/// Rows of the form panel, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Genre,
    Character,
    Setting,
    Mood,
    Emotion,
    OpeningLine,
    Length,
}

impl FormField {
    pub const ALL: [FormField; 7] = [
        FormField::Genre,
        FormField::Character,
        FormField::Setting,
        FormField::Mood,
        FormField::Emotion,
        FormField::OpeningLine,
        FormField::Length,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Genre => "Genre",
            FormField::Character => "Character",
            FormField::Setting => "Setting",
            FormField::Mood => "Tone",
            FormField::Emotion => "Emotion",
            FormField::OpeningLine => "Opening line",
            FormField::Length => "Length",
        }
    }

    /// Free-text fields are edited in insert mode; the rest cycle.
    pub fn is_text(self) -> bool {
        matches!(self, FormField::Character | FormField::OpeningLine)
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Slow operations the event loop awaits after drawing a busy status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Generate,
    Continue,
    Speak,
    ExportPdf,
    ExportDocx,
}

impl Task {
    pub fn action(self) -> Action {
        match self {
            Task::Generate => Action::Generate,
            Task::Continue => Action::Continue,
            Task::Speak => Action::Speak,
            Task::ExportPdf => Action::ExportPdf,
            Task::ExportDocx => Action::ExportDocx,
        }
    }

    pub fn busy_message(self) -> &'static str {
        match self {
            Task::Generate => "Generating...",
            Task::Continue => "Continuing story...",
            Task::Speak => "Narrating...",
            Task::ExportPdf => "Writing PDF...",
            Task::ExportDocx => "Writing DOCX...",
        }
    }
}

/// Main application state
pub struct App {
    pub session: StorySession,

    // UI state
    pub theme: StoryTheme,
    pub focused_panel: FocusedPanel,
    pub form_field: FormField,
    overlay: Option<Overlay>,

    // Story display
    pub story_scroll: usize,

    // History list, index into display order (most recent first)
    pub history_selected: usize,

    // Input state
    pub input_mode: InputMode,
    cursor_position: usize,

    // Status
    status: Option<Notice>,
    pub busy: Option<Task>,
}

impl App {
    pub fn new(session: StorySession) -> Self {
        let mut app = Self {
            session,
            theme: StoryTheme::default(),
            focused_panel: FocusedPanel::default(),
            form_field: FormField::default(),
            overlay: None,
            story_scroll: 0,
            history_selected: 0,
            input_mode: InputMode::Normal,
            cursor_position: 0,
            status: None,
            busy: None,
        };
        app.set_status("Fill in the form, then press g to generate. ? for help.");
        app
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    pub fn can(&self, action: Action) -> bool {
        self.busy.is_none() && self.session.available_actions().contains(&action)
    }

    // ========================================================================
    // Form
    // ========================================================================

    pub fn next_field(&mut self) {
        self.form_field = self.form_field.next();
    }

    pub fn prev_field(&mut self) {
        self.form_field = self.form_field.prev();
    }

    /// Step the focused dropdown to its next (or previous) option.
    pub fn cycle_value(&mut self, forward: bool) {
        let form = self.session.form_mut();
        match self.form_field {
            FormField::Genre => form.genre = Genre::cycle(form.genre, forward),
            FormField::Setting => form.setting = Setting::cycle(form.setting, forward),
            FormField::Mood => form.mood = Mood::cycle(form.mood, forward),
            FormField::Emotion => form.emotion = Emotion::cycle(form.emotion, forward),
            FormField::Length => form.length = form.length.cycle(forward),
            FormField::Character | FormField::OpeningLine => {}
        }
    }

    /// Start editing the focused text field, cursor at the end.
    pub fn enter_insert_mode(&mut self) -> bool {
        if !self.form_field.is_text() {
            return false;
        }
        self.focused_panel = FocusedPanel::Form;
        self.input_mode = InputMode::Insert;
        self.cursor_end();
        true
    }

    pub fn enter_normal_mode(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// The text of the focused field, if it is a free-text field.
    pub fn input_buffer(&self) -> &str {
        let form = self.session.form();
        match self.form_field {
            FormField::Character => &form.character,
            FormField::OpeningLine => &form.opening_line,
            _ => "",
        }
    }

    fn input_buffer_mut(&mut self) -> Option<&mut String> {
        let field = self.form_field;
        let form = self.session.form_mut();
        match field {
            FormField::Character => Some(&mut form.character),
            FormField::OpeningLine => Some(&mut form.opening_line),
            _ => None,
        }
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor_position
    }

    /// Handle a typed character (unicode-safe)
    pub fn type_char(&mut self, c: char) {
        let cursor = self.cursor_position;
        if let Some(buffer) = self.input_buffer_mut() {
            let byte_pos = buffer
                .char_indices()
                .nth(cursor)
                .map(|(i, _)| i)
                .unwrap_or(buffer.len());
            buffer.insert(byte_pos, c);
            self.cursor_position += 1;
        }
    }

    /// Handle backspace (unicode-safe)
    pub fn backspace(&mut self) {
        if self.cursor_position == 0 {
            return;
        }
        let cursor = self.cursor_position - 1;
        if let Some(buffer) = self.input_buffer_mut() {
            if let Some((byte_pos, ch)) = buffer.char_indices().nth(cursor) {
                buffer.replace_range(byte_pos..byte_pos + ch.len_utf8(), "");
            }
            self.cursor_position = cursor;
        }
    }

    /// Handle delete (unicode-safe)
    pub fn delete(&mut self) {
        let cursor = self.cursor_position;
        if let Some(buffer) = self.input_buffer_mut() {
            if let Some((byte_pos, ch)) = buffer.char_indices().nth(cursor) {
                buffer.replace_range(byte_pos..byte_pos + ch.len_utf8(), "");
            }
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.input_buffer().chars().count();
        self.cursor_position = (self.cursor_position + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor_position = self.input_buffer().chars().count();
    }

    // ========================================================================
    // Panels and scrolling
    // ========================================================================

    pub fn cycle_focus(&mut self) {
        self.focused_panel = match self.focused_panel {
            FocusedPanel::Form => FocusedPanel::Story,
            FocusedPanel::Story => FocusedPanel::History,
            FocusedPanel::History => FocusedPanel::Form,
        };
    }

    pub fn cycle_focus_reverse(&mut self) {
        self.focused_panel = match self.focused_panel {
            FocusedPanel::Form => FocusedPanel::History,
            FocusedPanel::Story => FocusedPanel::Form,
            FocusedPanel::History => FocusedPanel::Story,
        };
    }

    /// Scroll story up. The widget caps the offset at the real maximum.
    pub fn scroll_up(&mut self, lines: usize) {
        self.story_scroll = self.story_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        let max_scroll = self.estimate_max_scroll();
        self.story_scroll = (self.story_scroll + lines).min(max_scroll);
    }

    /// Conservative estimate assuming ~60 char effective width
    fn estimate_max_scroll(&self) -> usize {
        const ESTIMATED_WIDTH: usize = 60;

        let story = self.session.story();
        story
            .paragraphs()
            .map(|p| p.chars().count() / ESTIMATED_WIDTH + 2)
            .sum::<usize>()
            + 2
    }

    pub fn history_down(&mut self) {
        let len = self.session.history().len();
        if len > 0 {
            self.history_selected = (self.history_selected + 1).min(len - 1);
        }
    }

    pub fn history_up(&mut self) {
        self.history_selected = self.history_selected.saturating_sub(1);
    }

    // ========================================================================
    // Session actions
    // ========================================================================

    /// Archive the story and clear the screen and form.
    pub fn start_over(&mut self) {
        if self.busy.is_some() {
            return;
        }
        if self.session.start_over() {
            let label = self.session.history().len();
            self.set_status(format!("Story saved to history as #{label}"));
        } else {
            self.set_status("Started over");
        }
        self.history_selected = 0;
        self.story_scroll = 0;
        self.form_field = FormField::default();
        self.cursor_position = 0;
        self.absorb_notices();
    }

    /// Load the highlighted history entry.
    pub fn select_history(&mut self) {
        if !self.can(Action::SelectHistory) {
            self.set_status("No stories yet.");
            return;
        }
        let label = self
            .session
            .history()
            .display_items()
            .get(self.history_selected)
            .map(|item| item.label);

        if let Some(label) = label {
            match self.session.select_history(label) {
                Ok(()) => {
                    self.story_scroll = 0;
                    self.set_status(format!("Loaded story #{label}"));
                }
                Err(e) => self.set_error(e.to_string()),
            }
        }
    }

    /// Mark a slow task as started so the next frame shows its status.
    pub fn begin_task(&mut self, task: Task) {
        self.busy = Some(task);
        self.set_status(task.busy_message());
    }

    /// Await a slow task and report the outcome in the status line.
    pub async fn run_task(&mut self, task: Task) {
        let result: Result<Option<Artifact>, SessionError> = match task {
            Task::Generate => self.session.generate().await.map(|()| None),
            Task::Continue => self.session.continue_story().await.map(|()| None),
            Task::Speak => self.session.speak().await.map(Some),
            Task::ExportPdf => self.session.export_pdf().await.map(Some),
            Task::ExportDocx => self.session.export_docx().await.map(Some),
        };
        self.busy = None;

        match result {
            Ok(Some(artifact)) => self.set_status(format!(
                "Saved {} ({} bytes)",
                artifact.path.display(),
                artifact.size
            )),
            Ok(None) => {
                if task == Task::Generate {
                    self.story_scroll = 0;
                } else {
                    self.story_scroll = self.estimate_max_scroll();
                }
                self.set_status(match task {
                    Task::Generate => "Story ready. c to continue, r to start over.",
                    _ => "Story continued.",
                });
            }
            Err(e) => {
                warn!(?task, error = %e, "task failed");
                self.set_error(e.to_string());
            }
        }
        self.absorb_notices();
    }

    /// Show the controller's queued notices; errors win the status line.
    fn absorb_notices(&mut self) {
        let notices = self.session.drain_notices();
        if let Some(notice) = notices
            .iter()
            .rev()
            .find(|n| n.is_error())
            .or_else(|| notices.last())
        {
            self.status = Some(notice.clone());
        }
    }

    // ========================================================================
    // Overlay and status
    // ========================================================================

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
    }

    pub fn toggle_help(&mut self) {
        self.overlay = match self.overlay {
            Some(Overlay::Help) => None,
            None => Some(Overlay::Help),
        };
    }

    pub fn close_overlay(&mut self) {
        self.overlay = None;
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(Notice::info(message));
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.status = Some(Notice::error(message));
    }

    pub fn status(&self) -> Option<&Notice> {
        self.status.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use story_core::generator::GenerateError;
    use story_core::testing::{sample_form, MockGenerator, MockNarrator};

    fn app(dir: &std::path::Path, generator: &MockGenerator) -> App {
        let session = StorySession::with_parts(
            Arc::new(generator.clone()),
            Arc::new(MockNarrator::new()),
            dir,
        );
        App::new(session)
    }

    #[test]
    fn test_form_field_navigation_wraps() {
        assert_eq!(FormField::Genre.prev(), FormField::Length);
        assert_eq!(FormField::Length.next(), FormField::Genre);
        assert_eq!(FormField::Emotion.next(), FormField::OpeningLine);
    }

    #[test]
    fn test_cycle_value() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path(), &MockGenerator::default());

        app.cycle_value(true);
        assert_eq!(app.session.form().genre, Some(Genre::Fantasy));
        app.cycle_value(false);
        assert_eq!(app.session.form().genre, None);

        app.form_field = FormField::Length;
        app.cycle_value(true);
        assert_eq!(app.session.form().length, story_core::LengthTier::Long);
    }

    #[test]
    fn test_unicode_editing() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path(), &MockGenerator::default());

        app.form_field = FormField::OpeningLine;
        assert!(app.enter_insert_mode());
        for c in "Café".chars() {
            app.type_char(c);
        }
        app.cursor_left();
        app.type_char('x');
        assert_eq!(app.session.form().opening_line, "Cafxé");

        app.backspace();
        app.cursor_end();
        app.backspace();
        assert_eq!(app.session.form().opening_line, "Caf");
        assert_eq!(app.cursor_position(), 3);
    }

    #[test]
    fn test_insert_mode_only_on_text_fields() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path(), &MockGenerator::default());
        app.form_field = FormField::Mood;
        assert!(!app.enter_insert_mode());
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[tokio::test]
    async fn test_generate_then_start_over() {
        let dir = tempfile::tempdir().unwrap();
        let generator = MockGenerator::new(["Fog.", "She sat.", "Fog Tea"]);
        let mut app = app(dir.path(), &generator);
        *app.session.form_mut() = sample_form();

        app.begin_task(Task::Generate);
        assert_eq!(app.status().unwrap().message, "Generating...");
        assert!(!app.can(Action::Generate));

        app.run_task(Task::Generate).await;
        assert!(app.busy.is_none());
        assert_eq!(app.phase(), Phase::Ready);
        assert_eq!(app.session.story().title, "Fog Tea");

        app.start_over();
        assert_eq!(app.phase(), Phase::Empty);
        assert_eq!(app.status().unwrap().message, "Story saved to history as #1");

        app.select_history();
        assert_eq!(app.session.story().title, "Fog Tea");
    }

    #[tokio::test]
    async fn test_generator_failure_shows_error() {
        let dir = tempfile::tempdir().unwrap();
        let generator = MockGenerator::new(["Fog."]);
        generator.push_failure(GenerateError::Transport("offline".into()));
        generator.push_reply("Title");
        let mut app = app(dir.path(), &generator);
        *app.session.form_mut() = sample_form();

        app.run_task(Task::Generate).await;
        assert!(app.status().unwrap().is_error());
        assert!(app.session.story().body.contains(story_core::FAILURE_MARKER));
    }

    #[tokio::test]
    async fn test_incomplete_form_reports_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path(), &MockGenerator::default());

        app.run_task(Task::Generate).await;
        let status = app.status().unwrap();
        assert!(status.is_error());
        assert!(status.message.contains("genre"));
    }
}
