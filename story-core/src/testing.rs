//! Testing utilities for story sessions.
//!
//! This module provides tools for deterministic tests without API calls:
//! - `MockGenerator` returns scripted replies and records every call
//! - `MockNarrator` returns fake MP3 bytes and records what it was asked to read
//! - `TestHarness` wires both into a `StorySession`
//! - Assertion helpers for verifying session state

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::form::{Emotion, FormSelections, Genre, LengthTier, Mood, Setting};
use crate::generator::{GenerateError, TextGenerator};
use crate::narration::{NarrationError, Narrator};
use crate::session::StorySession;
use crate::workflow::Phase;

/// Reply used once the script runs out.
pub const DEFAULT_REPLY: &str = "The story went on.";

/// One recorded generator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorCall {
    pub prompt: String,
    pub max_tokens: usize,
}

#[derive(Default)]
struct MockState {
    replies: VecDeque<Result<String, GenerateError>>,
    calls: Vec<GeneratorCall>,
}

/// A generator that returns scripted replies in order.
///
/// Clones share the same script and call log, so a test can keep one
/// handle while the session owns another.
#[derive(Clone, Default)]
pub struct MockGenerator {
    state: Arc<Mutex<MockState>>,
}

impl MockGenerator {
    /// Create a mock with successful replies.
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mock = Self::default();
        for reply in replies {
            mock.push_reply(reply);
        }
        mock
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queue a successful reply.
    pub fn push_reply(&self, reply: impl Into<String>) {
        self.state().replies.push_back(Ok(reply.into()));
    }

    /// Queue a failed call.
    pub fn push_failure(&self, error: GenerateError) {
        self.state().replies.push_back(Err(error));
    }

    /// Every call made so far, oldest first.
    pub fn calls(&self) -> Vec<GeneratorCall> {
        self.state().calls.clone()
    }

    /// The most recent call.
    pub fn last_call(&self) -> Option<GeneratorCall> {
        self.state().calls.last().cloned()
    }

    /// Replies not yet consumed.
    pub fn remaining(&self) -> usize {
        self.state().replies.len()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str, max_tokens: usize) -> Result<String, GenerateError> {
        let mut state = self.state();
        state.calls.push(GeneratorCall {
            prompt: prompt.to_string(),
            max_tokens,
        });
        state
            .replies
            .pop_front()
            .unwrap_or_else(|| Ok(DEFAULT_REPLY.to_string()))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A narrator that returns a fake MP3 frame header followed by the text.
#[derive(Clone, Default)]
pub struct MockNarrator {
    texts: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl MockNarrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A narrator whose every call fails with a network error.
    pub fn failing() -> Self {
        Self {
            texts: Arc::default(),
            fail: true,
        }
    }

    /// Texts narrated so far.
    pub fn texts(&self) -> Vec<String> {
        self.texts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl Narrator for MockNarrator {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, NarrationError> {
        if self.fail {
            return Err(NarrationError::Network("mock narrator offline".to_string()));
        }
        self.texts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(text.to_string());

        let mut bytes = b"ID3".to_vec();
        bytes.extend_from_slice(text.as_bytes());
        Ok(bytes)
    }
}

/// The form used throughout the tests: Elena in the café.
pub fn sample_form() -> FormSelections {
    FormSelections::new()
        .with_genre(Genre::Fantasy)
        .with_setting(Setting::Cafe)
        .with_mood(Mood::Mysterious)
        .with_emotion(Emotion::Nervous)
        .with_opening_line("Elena walked into the dim café.")
        .with_length(LengthTier::Short)
}

/// Test harness wiring mocks into a [`StorySession`].
pub struct TestHarness {
    pub session: StorySession,
    pub generator: MockGenerator,
    pub narrator: MockNarrator,
}

impl TestHarness {
    /// Create a harness exporting into `export_dir`, with [`sample_form`] filled in.
    pub fn new(export_dir: impl AsRef<Path>) -> Self {
        Self::with_narrator(export_dir, MockNarrator::new())
    }

    pub fn with_narrator(export_dir: impl AsRef<Path>, narrator: MockNarrator) -> Self {
        let generator = MockGenerator::default();
        let mut session = StorySession::with_parts(
            Arc::new(generator.clone()),
            Arc::new(narrator.clone()),
            export_dir,
        );
        *session.form_mut() = sample_form();

        Self {
            session,
            generator,
            narrator,
        }
    }

    /// Queue generator replies.
    pub fn expect_replies<I, S>(&mut self, replies: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for reply in replies {
            self.generator.push_reply(reply);
        }
        self
    }

    /// Queue a generator failure.
    pub fn expect_failure(&mut self, error: GenerateError) -> &mut Self {
        self.generator.push_failure(error);
        self
    }

    /// Generate a story from scripted setting, passage and title replies.
    pub async fn generate_with(&mut self, setting: &str, passage: &str, title: &str) {
        self.expect_replies([setting, passage, title]);
        self.session
            .generate()
            .await
            .unwrap_or_else(|e| panic!("generate failed: {e}"));
    }

    pub fn body(&self) -> &str {
        &self.session.story().body
    }

    pub fn title(&self) -> &str {
        &self.session.story().title
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert the session is in the given phase.
#[track_caller]
pub fn assert_phase(harness: &TestHarness, phase: Phase) {
    assert_eq!(
        harness.session.phase(),
        phase,
        "Expected phase {phase:?}, got {:?}",
        harness.session.phase()
    );
}

/// Assert `needle` occurs exactly `times` times in the story body.
#[track_caller]
pub fn assert_occurrences(harness: &TestHarness, needle: &str, times: usize) {
    let actual = harness.body().matches(needle).count();
    assert_eq!(
        actual, times,
        "Expected '{needle}' {times} time(s) in body, found {actual}:\n{}",
        harness.body()
    );
}

/// Assert the history holds exactly these titles in append order.
#[track_caller]
pub fn assert_history_titles(harness: &TestHarness, titles: &[&str]) {
    let actual: Vec<&str> = harness
        .session
        .history()
        .entries()
        .iter()
        .map(|e| e.title.as_str())
        .collect();
    assert_eq!(actual, titles, "Unexpected history titles");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_generator_records_calls() {
        let mock = MockGenerator::new(["first"]);
        mock.push_failure(GenerateError::Transport("down".into()));

        assert_eq!(mock.generate("a", 10).await.unwrap(), "first");
        assert!(mock.generate("b", 20).await.is_err());
        assert_eq!(mock.generate("c", 30).await.unwrap(), DEFAULT_REPLY);

        let calls = mock.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1].prompt, "b");
        assert_eq!(mock.last_call().unwrap().max_tokens, 30);
        assert_eq!(mock.remaining(), 0);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let mock = MockGenerator::default();
        let handle = mock.clone();
        handle.push_reply("shared");
        assert_eq!(mock.generate("p", 1).await.unwrap(), "shared");
        assert_eq!(handle.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_mock_narrator() {
        let narrator = MockNarrator::new();
        let bytes = narrator.synthesize("Hi.").await.unwrap();
        assert_eq!(bytes, b"ID3Hi.");
        assert_eq!(narrator.texts(), vec!["Hi."]);

        assert!(MockNarrator::failing().synthesize("Hi.").await.is_err());
    }

    #[tokio::test]
    async fn test_harness_generate() {
        let dir = tempfile::tempdir().unwrap();
        let mut harness = TestHarness::new(dir.path());
        harness.generate_with("Fog.", "She sat.", "Fog Tea").await;

        assert_phase(&harness, Phase::Ready);
        assert_eq!(harness.title(), "Fog Tea");
        assert_occurrences(&harness, "Elena walked into the dim café.", 1);
    }
}
