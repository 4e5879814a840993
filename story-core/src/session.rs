//! StorySession - the primary public API for interactive story writing.
//!
//! This module wraps the workflow controller, the narrator, the exporters
//! and the form into a single value that a front end drives one action at a
//! time.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::fs;
use tracing::info;

use crate::config::AppConfig;
use crate::export::{self, ExportError, ExportFormat};
use crate::form::FormSelections;
use crate::generator::{OpenRouterGenerator, TextGenerator};
use crate::narration::{GoogleTts, NarrationError, Narrator};
use crate::story::{HistoryLog, StoryState};
use crate::workflow::{Action, Notice, Phase, Workflow, WorkflowError};

/// Errors from StorySession operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("export failed: {0}")]
    Export(#[from] ExportError),

    #[error("narration failed: {0}")]
    Narration(#[from] NarrationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("there is no story to export")]
    NothingToExport,
}

/// A file written to the export directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub format: ExportFormat,
    pub size: usize,
}

impl Artifact {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

/// One user's interactive story-writing session.
pub struct StorySession {
    workflow: Workflow,
    narrator: Arc<dyn Narrator>,
    export_dir: PathBuf,
    form: FormSelections,
}

impl StorySession {
    /// Create a session backed by OpenRouter and Google speech.
    pub fn from_config(config: &AppConfig) -> Self {
        let generator = OpenRouterGenerator::new(config.openrouter_client());
        let narrator = GoogleTts::new(&config.tts_lang);
        Self::with_parts(Arc::new(generator), Arc::new(narrator), &config.export_dir)
    }

    /// Create a session from explicit backends.
    pub fn with_parts(
        generator: Arc<dyn TextGenerator>,
        narrator: Arc<dyn Narrator>,
        export_dir: impl AsRef<Path>,
    ) -> Self {
        Self {
            workflow: Workflow::new(generator),
            narrator,
            export_dir: export_dir.as_ref().to_path_buf(),
            form: FormSelections::default(),
        }
    }

    pub fn form(&self) -> &FormSelections {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormSelections {
        &mut self.form
    }

    pub fn story(&self) -> &StoryState {
        self.workflow.story()
    }

    pub fn history(&self) -> &HistoryLog {
        self.workflow.history()
    }

    pub fn phase(&self) -> Phase {
        self.workflow.phase()
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    pub fn available_actions(&self) -> Vec<Action> {
        self.workflow.available_actions()
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.workflow.drain_notices()
    }

    /// Generate a new story from the current form.
    pub async fn generate(&mut self) -> Result<(), SessionError> {
        self.workflow.generate_initial(&self.form).await?;
        Ok(())
    }

    /// Flag the story for continuation; run it with [`Self::process_pending`].
    pub fn request_continue(&mut self) -> Result<(), SessionError> {
        self.workflow.request_continue()?;
        Ok(())
    }

    /// Run a pending continuation. Returns `false` when nothing was pending.
    pub async fn process_pending(&mut self) -> Result<bool, SessionError> {
        Ok(self.workflow.process_pending(&self.form).await?)
    }

    /// Append one paragraph to the story.
    pub async fn continue_story(&mut self) -> Result<(), SessionError> {
        self.workflow.continue_story(&self.form).await?;
        Ok(())
    }

    /// Archive the story and reset the story and the form.
    ///
    /// Returns `true` if a history entry was appended.
    pub fn start_over(&mut self) -> bool {
        let archived = self.workflow.start_over(&self.form);
        self.form = FormSelections::default();
        archived
    }

    /// Load a history entry by its 1-based label.
    pub fn select_history(&mut self, label: usize) -> Result<(), SessionError> {
        self.workflow.select_history(label)?;
        Ok(())
    }

    /// Render the current story in `format` without touching the disk.
    pub async fn render(&self, format: ExportFormat) -> Result<Vec<u8>, SessionError> {
        let story = self.workflow.story();
        if story.is_empty() {
            return Err(SessionError::NothingToExport);
        }
        let bytes = match format {
            ExportFormat::Pdf => export::export_pdf(&story.title, &story.body),
            ExportFormat::Docx => export::export_docx(&story.title, &story.body)?,
            ExportFormat::Mp3 => self.narrator.synthesize(&story.body).await?,
        };
        Ok(bytes)
    }

    /// Render the current story and write it to the export directory.
    pub async fn export(&self, format: ExportFormat) -> Result<Artifact, SessionError> {
        let bytes = self.render(format).await?;

        fs::create_dir_all(&self.export_dir).await?;
        let path = self
            .export_dir
            .join(format.file_name(&self.workflow.story().title));
        fs::write(&path, &bytes).await?;

        info!(path = %path.display(), bytes = bytes.len(), mime = format.mime_type(), "exported story");
        Ok(Artifact {
            path,
            format,
            size: bytes.len(),
        })
    }

    pub async fn export_pdf(&self) -> Result<Artifact, SessionError> {
        self.export(ExportFormat::Pdf).await
    }

    pub async fn export_docx(&self) -> Result<Artifact, SessionError> {
        self.export(ExportFormat::Docx).await
    }

    /// Narrate the story and write the MP3 to the export directory.
    pub async fn speak(&self) -> Result<Artifact, SessionError> {
        self.export(ExportFormat::Mp3).await
    }
}
