//! Story display widget

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    symbols::scrollbar,
    text::{Line, Span},
    widgets::{
        Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
        StatefulWidget, Widget, Wrap,
    },
};

use story_core::{StoryState, FAILURE_MARKER};

use crate::ui::theme::StoryTheme;

/// Widget for displaying the story title and paragraphs
pub struct StoryWidget<'a> {
    story: &'a StoryState,
    scroll: usize,
    theme: &'a StoryTheme,
    focused: bool,
    busy: Option<&'a str>,
}

impl<'a> StoryWidget<'a> {
    pub fn new(story: &'a StoryState, theme: &'a StoryTheme) -> Self {
        Self {
            story,
            scroll: 0,
            theme,
            focused: false,
            busy: None,
        }
    }

    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Show a busy message in place of (or under) the story.
    pub fn busy(mut self, message: Option<&'a str>) -> Self {
        self.busy = message;
        self
    }

    fn lines(&self) -> Vec<Line<'a>> {
        let mut lines: Vec<Line> = Vec::new();

        if self.story.is_empty() {
            if self.busy.is_none() {
                lines.push(Line::from(Span::styled(
                    "Fill in the form and press g to generate a story.",
                    self.theme.placeholder_style(),
                )));
            }
        } else {
            if !self.story.title.is_empty() {
                lines.push(
                    Line::from(Span::styled(
                        self.story.title.as_str(),
                        self.theme.story_title_style(),
                    ))
                    .alignment(Alignment::Center),
                );
                lines.push(Line::from(""));
            }

            for paragraph in self.story.paragraphs() {
                let style = if paragraph.contains(FAILURE_MARKER) {
                    self.theme.error_style()
                } else {
                    self.theme.story_style()
                };
                for line in paragraph.lines() {
                    lines.push(Line::from(Span::styled(line, style)));
                }
                lines.push(Line::from(""));
            }
        }

        if let Some(message) = self.busy {
            lines.push(Line::from(Span::styled(
                message,
                self.theme.info_style().add_modifier(Modifier::ITALIC),
            )));
        }

        lines
    }
}

impl Widget for StoryWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = if self.focused {
            " Story [j/k scroll] "
        } else {
            " Story "
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.focused));

        let inner = block.inner(area);
        block.render(area, buf);

        let lines = self.lines();

        // Line count before wrapping; good enough for the scrollbar
        let visible_height = inner.height as usize;
        let total_lines = lines.len();
        let max_scroll = total_lines.saturating_sub(visible_height);
        let scroll = self.scroll.min(max_scroll);

        Paragraph::new(lines)
            .scroll((scroll as u16, 0))
            .wrap(Wrap { trim: false })
            .render(inner, buf);

        if total_lines > visible_height {
            let scrollbar_area = Rect {
                x: inner.x + inner.width.saturating_sub(1),
                y: inner.y,
                width: 1,
                height: inner.height,
            };

            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .symbols(scrollbar::VERTICAL)
                .thumb_style(Style::default().fg(Color::DarkGray))
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"));

            let mut scrollbar_state = ScrollbarState::new(max_scroll).position(scroll);
            scrollbar.render(scrollbar_area, buf, &mut scrollbar_state);

            if scroll < max_scroll {
                let remaining = max_scroll - scroll;
                let hint = format!(" ↓{remaining} more ");
                let hint_y = inner.y + inner.height.saturating_sub(1);
                let hint_style = Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::DIM);
                for (i, ch) in hint.chars().enumerate() {
                    let x = inner.x + (i as u16);
                    if x < inner.x + inner.width.saturating_sub(2) {
                        buf[(x, hint_y)].set_char(ch).set_style(hint_style);
                    }
                }
            }
        }
    }
}
