//! Event handling for the storyteller TUI

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{App, InputMode, Task};
use crate::ui::FocusedPanel;

/// Result of handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Continue,
    Quit,
    NeedsRedraw,
    /// A slow task the event loop must await after redrawing.
    RunTask(Task),
}

/// Handle a terminal event
pub fn handle_event(app: &mut App, event: Event) -> EventResult {
    match event {
        Event::Key(key) => handle_key_event(app, key),
        Event::Mouse(mouse) => handle_mouse_event(app, mouse),
        Event::Resize(_, _) => EventResult::NeedsRedraw,
        _ => EventResult::Continue,
    }
}

/// Handle a mouse event
fn handle_mouse_event(app: &mut App, mouse: MouseEvent) -> EventResult {
    match mouse.kind {
        MouseEventKind::ScrollUp => {
            app.scroll_up(3);
            EventResult::NeedsRedraw
        }
        MouseEventKind::ScrollDown => {
            app.scroll_down(3);
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

/// Handle a key event
fn handle_key_event(app: &mut App, key: KeyEvent) -> EventResult {
    // Global shortcuts (always work)
    if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
        return EventResult::Quit;
    }

    if app.has_overlay() {
        return handle_overlay_key(app, key);
    }

    // Nothing else while a task is running
    if app.busy.is_some() {
        return EventResult::Continue;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Insert => handle_insert_mode(app, key),
    }
}

/// Handle keys in NORMAL mode (navigation and hotkeys)
fn handle_normal_mode(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Char('?') | KeyCode::F(1) => {
            app.toggle_help();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('q') => EventResult::Quit,
        KeyCode::Char('t') => {
            app.toggle_theme();
            EventResult::NeedsRedraw
        }

        // Panel focus cycling
        KeyCode::Tab => {
            app.cycle_focus();
            EventResult::NeedsRedraw
        }
        KeyCode::BackTab => {
            app.cycle_focus_reverse();
            EventResult::NeedsRedraw
        }

        // Story actions
        KeyCode::Char('g') => task(app, Task::Generate),
        KeyCode::Char('c') => task(app, Task::Continue),
        KeyCode::Char('s') => task(app, Task::Speak),
        KeyCode::Char('p') => task(app, Task::ExportPdf),
        KeyCode::Char('d') => task(app, Task::ExportDocx),
        KeyCode::Char('r') => {
            app.start_over();
            EventResult::NeedsRedraw
        }

        KeyCode::PageUp => {
            app.scroll_up(10);
            EventResult::NeedsRedraw
        }
        KeyCode::PageDown => {
            app.scroll_down(10);
            EventResult::NeedsRedraw
        }

        _ => match app.focused_panel {
            FocusedPanel::Form => handle_form_keys(app, key),
            FocusedPanel::Story => handle_story_keys(app, key),
            FocusedPanel::History => handle_history_keys(app, key),
        },
    }
}

/// Run a task if the session offers it; otherwise explain why not.
fn task(app: &mut App, task: Task) -> EventResult {
    if app.can(task.action()) {
        EventResult::RunTask(task)
    } else {
        app.set_error("Generate a story first.");
        EventResult::NeedsRedraw
    }
}

/// Form panel: move between fields, cycle options, start editing
fn handle_form_keys(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.next_field(),
        KeyCode::Char('k') | KeyCode::Up => app.prev_field(),
        KeyCode::Char('l') | KeyCode::Right => app.cycle_value(true),
        KeyCode::Char('h') | KeyCode::Left => app.cycle_value(false),
        KeyCode::Char('i') | KeyCode::Char('a') | KeyCode::Enter => {
            if !app.enter_insert_mode() {
                app.cycle_value(true);
            }
        }
        _ => return EventResult::Continue,
    }
    EventResult::NeedsRedraw
}

fn handle_story_keys(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(1),
        KeyCode::Home => app.story_scroll = 0,
        _ => return EventResult::Continue,
    }
    EventResult::NeedsRedraw
}

fn handle_history_keys(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.history_down(),
        KeyCode::Char('k') | KeyCode::Up => app.history_up(),
        KeyCode::Enter => app.select_history(),
        _ => return EventResult::Continue,
    }
    EventResult::NeedsRedraw
}

/// Handle keys in INSERT mode (free text input)
fn handle_insert_mode(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => app.enter_normal_mode(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.delete(),
        KeyCode::Char(c) => app.type_char(c),
        _ => return EventResult::Continue,
    }
    EventResult::NeedsRedraw
}

/// Handle key when overlay is open
fn handle_overlay_key(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') | KeyCode::Enter => {
            app.close_overlay();
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::FormField;
    use std::sync::Arc;
    use story_core::testing::{MockGenerator, MockNarrator};
    use story_core::{Genre, StorySession};

    fn app() -> (App, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let session = StorySession::with_parts(
            Arc::new(MockGenerator::default()),
            Arc::new(MockNarrator::new()),
            dir.path(),
        );
        (App::new(session), dir)
    }

    fn press(app: &mut App, code: KeyCode) -> EventResult {
        handle_event(app, Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    #[test]
    fn test_hotkeys_map_to_tasks() {
        let (mut app, _dir) = app();
        assert_eq!(press(&mut app, KeyCode::Char('g')), EventResult::RunTask(Task::Generate));
        assert_eq!(press(&mut app, KeyCode::Char('q')), EventResult::Quit);
    }

    #[tokio::test]
    async fn test_story_hotkeys_need_a_story() {
        let generator = MockGenerator::new(["Fog.", "She sat.", "Fog Tea"]);
        let dir = tempfile::tempdir().unwrap();
        let session = StorySession::with_parts(
            Arc::new(generator),
            Arc::new(MockNarrator::new()),
            dir.path(),
        );
        let mut app = App::new(session);

        assert_eq!(press(&mut app, KeyCode::Char('c')), EventResult::NeedsRedraw);
        assert!(app.status().unwrap().is_error());

        *app.session.form_mut() = story_core::testing::sample_form();
        app.run_task(Task::Generate).await;

        assert_eq!(press(&mut app, KeyCode::Char('c')), EventResult::RunTask(Task::Continue));
        assert_eq!(press(&mut app, KeyCode::Char('p')), EventResult::RunTask(Task::ExportPdf));
        assert_eq!(press(&mut app, KeyCode::Char('s')), EventResult::RunTask(Task::Speak));
    }

    #[test]
    fn test_ctrl_c_quits_from_insert_mode() {
        let (mut app, _dir) = app();
        app.form_field = FormField::OpeningLine;
        press(&mut app, KeyCode::Char('i'));
        assert_eq!(app.input_mode, InputMode::Insert);

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_event(&mut app, Event::Key(ctrl_c)), EventResult::Quit);
    }

    #[test]
    fn test_typing_in_insert_mode_is_not_a_hotkey() {
        let (mut app, _dir) = app();
        app.form_field = FormField::OpeningLine;
        press(&mut app, KeyCode::Enter);

        for c in "go quickly".chars() {
            assert_eq!(press(&mut app, KeyCode::Char(c)), EventResult::NeedsRedraw);
        }
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.session.form().opening_line, "go quickly");
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_form_navigation_and_cycling() {
        let (mut app, _dir) = app();
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.session.form().genre, Some(Genre::Fantasy));
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.session.form().genre, Some(Genre::SciFi));

        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.form_field, FormField::Character);
    }

    #[test]
    fn test_busy_ignores_keys() {
        let (mut app, _dir) = app();
        app.begin_task(Task::Generate);
        assert_eq!(press(&mut app, KeyCode::Char('g')), EventResult::Continue);
    }

    #[test]
    fn test_help_overlay_swallows_keys() {
        let (mut app, _dir) = app();
        press(&mut app, KeyCode::Char('?'));
        assert!(app.has_overlay());
        assert_eq!(press(&mut app, KeyCode::Char('g')), EventResult::Continue);
        press(&mut app, KeyCode::Esc);
        assert!(!app.has_overlay());
    }
}
