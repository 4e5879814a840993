//! Behavioral tests for the story workflow, driven through the mock generator.

use story_core::generator::GenerateError;
use story_core::testing::{
    assert_history_titles, assert_occurrences, assert_phase, TestHarness,
};
use story_core::{ExportFormat, Phase, SessionError, WorkflowError, FAILURE_MARKER};

const OPENING: &str = "Elena walked into the dim café.";

#[tokio::test]
async fn test_scenario_short_story_budget_and_opening_line() {
    let dir = tempfile::tempdir().unwrap();
    let mut harness = TestHarness::new(dir.path());

    harness
        .generate_with(
            "Steam curled from chipped cups.",
            "Elena walked into the dim café. She ordered tea and waited.",
            "The Dim Café",
        )
        .await;

    let calls = harness.generator.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[1].max_tokens, 330, "short tier plus overhead");
    assert!(calls[1].prompt.contains(OPENING));

    assert_phase(&harness, Phase::Ready);
    assert_eq!(harness.title(), "The Dim Café");
    assert!(harness.body().starts_with("Steam curled from chipped cups.\n\n"));
    assert_occurrences(&harness, OPENING, 1);
    assert!(harness.body().ends_with("She ordered tea and waited."));
}

#[tokio::test]
async fn test_failed_passage_keeps_opening_line_once() {
    let dir = tempfile::tempdir().unwrap();
    let mut harness = TestHarness::new(dir.path());

    harness
        .expect_replies(["Steam curled from chipped cups."])
        .expect_failure(GenerateError::Transport("timed out".into()))
        .expect_replies(["The Dim Café"]);
    harness.session.generate().await.unwrap();

    assert_phase(&harness, Phase::Ready);
    assert_occurrences(&harness, OPENING, 1);
    assert_eq!(
        harness.body(),
        format!("Steam curled from chipped cups.\n\n{OPENING} {FAILURE_MARKER}")
    );
    assert_eq!(harness.title(), "The Dim Café");

    let errors = harness
        .session
        .drain_notices()
        .into_iter()
        .filter(|n| n.is_error())
        .count();
    assert_eq!(errors, 1);
}

#[tokio::test]
async fn test_passage_sharing_a_prefix_is_kept_whole() {
    let dir = tempfile::tempdir().unwrap();
    let mut harness = TestHarness::new(dir.path());
    harness.session.form_mut().opening_line = "Rain fell.".into();

    harness
        .generate_with(
            "Gutters overflowed.",
            "Rainwater pooled by the door.  Nobody moved.",
            "Gutters",
        )
        .await;

    assert_occurrences(&harness, "Rain fell.", 1);
    assert_eq!(
        harness.body(),
        "Gutters overflowed.\n\nRain fell. Rainwater pooled by the door.  Nobody moved."
    );
}

#[tokio::test]
async fn test_continue_appends_one_paragraph() {
    let dir = tempfile::tempdir().unwrap();
    let mut harness = TestHarness::new(dir.path());
    harness.generate_with("Fog.", "She sat.", "Fog").await;
    let before = harness.body().to_string();

    harness.expect_replies(["A stranger sat down."]);
    harness.session.continue_story().await.unwrap();

    assert_eq!(harness.body(), format!("{before}\n\nA stranger sat down."));
    assert_eq!(harness.session.story().paragraphs().count(), 3);
    assert_eq!(harness.generator.last_call().unwrap().max_tokens, 330);
    assert_phase(&harness, Phase::Ready);
}

#[tokio::test]
async fn test_failed_call_leaves_marker_and_notice() {
    let dir = tempfile::tempdir().unwrap();
    let mut harness = TestHarness::new(dir.path());
    harness.generate_with("Fog.", "She sat.", "Fog").await;

    harness.expect_failure(GenerateError::Transport("connection reset".into()));
    harness.session.continue_story().await.unwrap();

    assert!(harness.body().ends_with(FAILURE_MARKER));
    let notices = harness.session.drain_notices();
    assert!(notices.iter().any(|n| n.is_error()));
    assert_phase(&harness, Phase::Ready);
}

#[tokio::test]
async fn test_start_over_archives_once_per_title() {
    let dir = tempfile::tempdir().unwrap();
    let mut harness = TestHarness::new(dir.path());

    harness.generate_with("Fog.", "She sat.", "Fog").await;
    assert!(harness.session.start_over());
    assert_phase(&harness, Phase::Empty);
    assert_history_titles(&harness, &["Fog"]);

    // the form was reset, so fill it again before the second story
    *harness.session.form_mut() = story_core::testing::sample_form();
    harness.generate_with("Rain.", "She ran.", "Fog").await;
    assert!(!harness.session.start_over(), "duplicate title is not archived");
    assert_history_titles(&harness, &["Fog"]);

    // an empty screen archives nothing
    assert!(!harness.session.start_over());
    assert_eq!(harness.session.history().len(), 1);
}

#[tokio::test]
async fn test_select_history_cancels_pending_continuation() {
    let dir = tempfile::tempdir().unwrap();
    let mut harness = TestHarness::new(dir.path());

    harness.generate_with("Fog.", "She sat.", "First").await;
    harness.session.start_over();
    *harness.session.form_mut() = story_core::testing::sample_form();
    harness.generate_with("Rain.", "She ran.", "Second").await;

    harness.session.request_continue().unwrap();
    assert_phase(&harness, Phase::Continuing);

    harness.session.select_history(1).unwrap();
    assert_eq!(harness.title(), "First");
    assert_phase(&harness, Phase::Ready);

    let calls_before = harness.generator.calls().len();
    assert!(!harness.session.process_pending().await.unwrap());
    assert_eq!(harness.generator.calls().len(), calls_before);
}

#[tokio::test]
async fn test_unknown_history_label() {
    let dir = tempfile::tempdir().unwrap();
    let mut harness = TestHarness::new(dir.path());

    let err = harness.session.select_history(3).unwrap_err();
    assert!(matches!(
        err,
        SessionError::Workflow(WorkflowError::UnknownHistoryEntry(3))
    ));
}

#[tokio::test]
async fn test_generate_requires_complete_form() {
    let dir = tempfile::tempdir().unwrap();
    let mut harness = TestHarness::new(dir.path());
    harness.session.form_mut().genre = None;
    harness.session.form_mut().opening_line.clear();

    let err = harness.session.generate().await.unwrap_err();
    match err {
        SessionError::Workflow(WorkflowError::IncompleteForm(missing)) => {
            assert!(missing.contains(&"genre"));
            assert!(missing.contains(&"opening line"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(harness.generator.calls().is_empty());
    assert_phase(&harness, Phase::Empty);
}

#[tokio::test]
async fn test_pdf_export_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let mut harness = TestHarness::new(dir.path());
    harness.generate_with("Fog.", "She sat.", "Fog").await;

    let first = harness.session.render(ExportFormat::Pdf).await.unwrap();
    let second = harness.session.render(ExportFormat::Pdf).await.unwrap();
    assert_eq!(first, second);
    assert!(first.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn test_speak_narrates_story_body() {
    let dir = tempfile::tempdir().unwrap();
    let mut harness = TestHarness::new(dir.path());
    harness.generate_with("Fog.", "She sat.", "Fog").await;

    let artifact = harness.session.speak().await.unwrap();
    assert_eq!(artifact.mime_type(), "audio/mpeg");
    assert_eq!(harness.narrator.texts(), vec![harness.body().to_string()]);
}
