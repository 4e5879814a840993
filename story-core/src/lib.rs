//! Story-writing engine with AI text generation.
//!
//! This crate provides:
//! - Form selections (genre, setting, tone, emotion, length) that steer generation
//! - A workflow controller that generates, continues and archives stories
//! - Text-to-speech narration
//! - PDF and DOCX export
//!
//! # Quick Start
//!
//! ```ignore
//! use story_core::{AppConfig, Emotion, Genre, Mood, Setting, StorySession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::from_env()?;
//!     let mut session = StorySession::from_config(&config);
//!
//!     *session.form_mut() = session
//!         .form()
//!         .clone()
//!         .with_genre(Genre::Fantasy)
//!         .with_setting(Setting::Cafe)
//!         .with_mood(Mood::Mysterious)
//!         .with_emotion(Emotion::Nervous)
//!         .with_opening_line("Elena walked into the dim café.");
//!
//!     session.generate().await?;
//!     println!("{}\n\n{}", session.story().title, session.story().body);
//!
//!     session.export_pdf().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod export;
pub mod form;
pub mod generator;
pub mod narration;
pub mod prompts;
pub mod session;
pub mod story;
pub mod testing;
pub mod workflow;

// Primary public API
pub use config::{AppConfig, ConfigError};
pub use export::{ExportError, ExportFormat};
pub use form::{Choice, Emotion, FormSelections, Genre, LengthTier, Mood, Setting};
pub use generator::{GenerateError, OpenRouterGenerator, TextGenerator, FAILURE_MARKER};
pub use narration::{GoogleTts, NarrationError, Narrator};
pub use session::{Artifact, SessionError, StorySession};
pub use story::{HistoryEntry, HistoryItem, HistoryLog, StoryState};
pub use testing::{MockGenerator, MockNarrator, TestHarness};
pub use workflow::{Action, Notice, NoticeLevel, Phase, Workflow, WorkflowError};
