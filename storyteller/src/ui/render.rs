//! Render orchestration for the storyteller TUI

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use story_core::{Action, Phase};

use crate::app::{App, FormField, InputMode};
use crate::ui::layout::{centered_rect_fixed, AppLayout};
use crate::ui::widgets::{FormWidget, HistoryWidget, InputWidget, StoryWidget};

/// Which panel is focused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusedPanel {
    #[default]
    Form,
    Story,
    History,
}

/// Overlay types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Help,
}

/// Hotkeys shown in the bottom bar, each tied to the action it triggers.
const HOTKEYS: [(&str, &str, Action); 7] = [
    ("g", "generate", Action::Generate),
    ("c", "continue", Action::Continue),
    ("r", "start over", Action::StartOver),
    ("s", "speak", Action::Speak),
    ("p", "pdf", Action::ExportPdf),
    ("d", "docx", Action::ExportDocx),
    ("⏎", "load", Action::SelectHistory),
];

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    frame.render_widget(Block::default().style(app.theme.base_style()), area);

    let layout = AppLayout::calculate(area);

    render_title_bar(frame, app, layout.title_area);

    let form_widget = FormWidget::new(app.session.form(), &app.theme)
        .selected(app.form_field)
        .focused(app.focused_panel == FocusedPanel::Form)
        .editing(app.input_mode == InputMode::Insert);
    frame.render_widget(form_widget, layout.form_area);

    let story_widget = StoryWidget::new(app.session.story(), &app.theme)
        .scroll(app.story_scroll)
        .focused(app.focused_panel == FocusedPanel::Story)
        .busy(app.busy.map(|task| task.busy_message()));
    frame.render_widget(story_widget, layout.story_area);

    let history_widget = HistoryWidget::new(app.session.history(), &app.theme)
        .selected(app.history_selected)
        .focused(app.focused_panel == FocusedPanel::History);
    frame.render_widget(history_widget, layout.history_area);

    render_input(frame, app, layout.input_area);
    render_status_bar(frame, app, layout.status_bar);
    render_hotkey_bar(frame, app, layout.hotkey_bar);

    if let Some(overlay) = app.overlay() {
        render_overlay(frame, app, overlay, area);
    }
}

/// Render the title bar
fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let phase = match app.phase() {
        Phase::Empty => "new story",
        Phase::Ready => "ready",
        Phase::Generating => "generating",
        Phase::Continuing => "continuing",
    };
    let title = format!(
        " Storyteller | {} | {} in history ",
        phase,
        app.session.history().len()
    );

    let line = Line::from(Span::styled(title, app.theme.story_title_style()));
    frame.render_widget(Paragraph::new(line), area);
}

/// Render the text field editor
fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let editing = app.input_mode == InputMode::Insert;
    let field = if editing {
        app.form_field
    } else {
        FormField::OpeningLine
    };
    let content = if editing {
        app.input_buffer()
    } else {
        app.session.form().opening_line.as_str()
    };

    let input_widget = InputWidget::new(content, &app.theme)
        .label(field.label())
        .cursor_position(app.cursor_position())
        .active(editing);

    frame.render_widget(input_widget, area);
}

/// Render the status line
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mode = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Insert => " INSERT ",
    };

    let mut spans = vec![Span::styled(
        mode,
        Style::default()
            .add_modifier(Modifier::REVERSED | Modifier::BOLD)
            .fg(app.theme.border_focused),
    )];

    if let Some(status) = app.status() {
        let style = if status.is_error() {
            app.theme.error_style()
        } else {
            app.theme.info_style()
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(status.message.as_str(), style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the hotkey bar; unavailable actions are dimmed.
fn render_hotkey_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = Vec::new();
    for (key, label, action) in HOTKEYS {
        let enabled = app.can(action);
        spans.push(Span::styled(format!(" {key}"), app.theme.hotkey_style(enabled)));
        spans.push(Span::styled(format!(" {label} "), app.theme.label_style()));
    }
    spans.push(Span::styled(" t", app.theme.hotkey_style(true)));
    spans.push(Span::styled(" theme ", app.theme.label_style()));
    spans.push(Span::styled(" ?", app.theme.hotkey_style(true)));
    spans.push(Span::styled(" help ", app.theme.label_style()));
    spans.push(Span::styled(" q", app.theme.hotkey_style(true)));
    spans.push(Span::styled(" quit", app.theme.label_style()));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render overlay
fn render_overlay(frame: &mut Frame, app: &App, overlay: &Overlay, area: Rect) {
    match overlay {
        Overlay::Help => render_help_overlay(frame, app, area),
    }
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let popup_area = centered_rect_fixed(54, 24, area);

    frame.render_widget(Clear, popup_area);

    let heading = |text: &'static str| {
        Line::from(Span::styled(
            text,
            Style::default().add_modifier(Modifier::UNDERLINED),
        ))
    };

    let help_text = vec![
        Line::from(Span::styled(
            " Storyteller - Help ",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        heading("Form:"),
        Line::from("  j/k or ↑/↓     Move between fields"),
        Line::from("  h/l or ←/→     Change the selected option"),
        Line::from("  i or Enter     Edit character name / opening line"),
        Line::from("  Esc            Finish editing"),
        Line::from(""),
        heading("Story:"),
        Line::from("  g              Generate a new story"),
        Line::from("  c              Continue the story"),
        Line::from("  r              Start over (saves to history)"),
        Line::from("  s / p / d      Save as MP3 / PDF / DOCX"),
        Line::from(""),
        heading("Panels:"),
        Line::from("  Tab            Cycle panel focus"),
        Line::from("  j/k            Scroll story / move in history"),
        Line::from("  Enter          Load the highlighted story"),
        Line::from("  t              Toggle dark/light theme"),
        Line::from("  q              Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "Press Esc or q to close",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(app.theme.border_style(true))
        .style(app.theme.base_style());

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;
    use story_core::testing::{MockGenerator, MockNarrator};
    use story_core::StorySession;

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 36)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app() -> (App, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let session = StorySession::with_parts(
            Arc::new(MockGenerator::default()),
            Arc::new(MockNarrator::new()),
            dir.path(),
        );
        (App::new(session), dir)
    }

    #[test]
    fn test_initial_screen() {
        let (app, _dir) = app();
        let out = screen(&app);
        assert!(out.contains("Storyteller | new story"));
        assert!(out.contains("Select a genre"));
        assert!(out.contains("No stories yet."));
        assert!(out.contains("press g to generate"));
    }

    #[test]
    fn test_help_overlay() {
        let (mut app, _dir) = app();
        app.toggle_help();
        let out = screen(&app);
        assert!(out.contains("Storyteller - Help"));
    }
}
