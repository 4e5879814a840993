//! Integration tests that call the real OpenRouter API.
//!
//! These tests require API_KEY to be set (via .env file or environment).
//! Run with: `cargo test -p story-core --test live_generation -- --ignored`

use story_core::testing::sample_form;
use story_core::{AppConfig, StorySession, FAILURE_MARKER};

/// Load environment variables from .env file
fn setup() -> Option<AppConfig> {
    let _ = dotenvy::dotenv();
    AppConfig::from_env().ok()
}

#[tokio::test]
#[ignore] // Run with: cargo test -p story-core --test live_generation -- --ignored
async fn test_live_generate_and_continue() {
    let Some(mut config) = setup() else {
        eprintln!("Skipping test: API_KEY not set");
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    config.export_dir = dir.path().to_path_buf();

    let mut session = StorySession::from_config(&config);
    *session.form_mut() = sample_form();

    session.generate().await.expect("generate should succeed");
    let story = session.story();
    assert!(!story.title.is_empty());
    assert!(!story.body.contains(FAILURE_MARKER), "body: {}", story.body);
    assert_eq!(story.body.matches("Elena walked into the dim café.").count(), 1);

    session.continue_story().await.expect("continue should succeed");
    assert!(session.story().paragraphs().count() >= 3);

    let pdf = session.export_pdf().await.expect("pdf export");
    assert!(pdf.path.exists());
}
