//! Text field editor widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::ui::theme::StoryTheme;

/// Input field widget for the opening line and character name
pub struct InputWidget<'a> {
    content: &'a str,
    cursor_position: usize,
    theme: &'a StoryTheme,
    label: &'a str,
    placeholder: &'a str,
    is_active: bool,
}

impl<'a> InputWidget<'a> {
    pub fn new(content: &'a str, theme: &'a StoryTheme) -> Self {
        Self {
            content,
            cursor_position: content.chars().count(),
            theme,
            label: "Opening line",
            placeholder: "Press i to type your opening line...",
            is_active: false,
        }
    }

    pub fn cursor_position(mut self, pos: usize) -> Self {
        self.cursor_position = pos;
        self
    }

    pub fn label(mut self, label: &'a str) -> Self {
        self.label = label;
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }

    fn line(&self) -> Line<'a> {
        let prefix = Span::styled("> ", self.theme.input_style());

        if self.content.is_empty() && !self.is_active {
            return Line::from(vec![
                prefix,
                Span::styled(self.placeholder, self.theme.placeholder_style()),
            ]);
        }

        if !self.is_active {
            return Line::from(vec![prefix, Span::raw(self.content)]);
        }

        // Use character-based slicing for unicode safety
        let before_cursor: String = self.content.chars().take(self.cursor_position).collect();
        let at_cursor = self
            .content
            .chars()
            .nth(self.cursor_position)
            .map(|c| c.to_string())
            .unwrap_or_else(|| " ".to_string());
        let after_cursor: String = self
            .content
            .chars()
            .skip(self.cursor_position + 1)
            .collect();

        Line::from(vec![
            prefix,
            Span::raw(before_cursor),
            Span::styled(
                at_cursor,
                Style::default()
                    .add_modifier(Modifier::UNDERLINED | Modifier::BOLD)
                    .fg(self.theme.input_text),
            ),
            Span::raw(after_cursor),
        ])
    }
}

impl Widget for InputWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = if self.is_active {
            format!(" {} [Esc done] ", self.label)
        } else {
            format!(" {} ", self.label)
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.is_active));

        let inner = block.inner(area);
        block.render(area, buf);

        // Keep the cursor in view on long lines
        let line = self.line();
        let width = inner.width as usize;
        let offset = if self.is_active {
            (self.cursor_position + 3).saturating_sub(width)
        } else {
            0
        };

        Paragraph::new(line)
            .scroll((0, offset as u16))
            .render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_splits_unicode() {
        let theme = StoryTheme::default();
        let widget = InputWidget::new("café au lait", &theme)
            .cursor_position(3)
            .active(true);
        let line = widget.line();
        assert_eq!(line.spans[1].content, "caf");
        assert_eq!(line.spans[2].content, "é");
        assert_eq!(line.spans[3].content, " au lait");
    }

    #[test]
    fn test_placeholder_when_idle() {
        let theme = StoryTheme::default();
        let widget = InputWidget::new("", &theme);
        assert_eq!(
            widget.line().to_string(),
            "> Press i to type your opening line..."
        );
    }
}
