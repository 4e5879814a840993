//! History list widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use story_core::HistoryLog;

use crate::ui::theme::StoryTheme;

/// Archived stories, most recent first
pub struct HistoryWidget<'a> {
    history: &'a HistoryLog,
    theme: &'a StoryTheme,
    selected: usize,
    focused: bool,
}

impl<'a> HistoryWidget<'a> {
    pub fn new(history: &'a HistoryLog, theme: &'a StoryTheme) -> Self {
        Self {
            history,
            theme,
            selected: 0,
            focused: false,
        }
    }

    /// Highlighted row, in display order.
    pub fn selected(mut self, index: usize) -> Self {
        self.selected = index;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

impl Widget for HistoryWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = if self.focused {
            " History [Enter load] "
        } else {
            " History "
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.focused));

        let inner = block.inner(area);
        block.render(area, buf);

        if self.history.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                "No stories yet.",
                self.theme.placeholder_style(),
            )))
            .render(inner, buf);
            return;
        }

        let items = self.history.display_items();
        let visible = inner.height as usize;
        // Keep the selection on screen
        let offset = (self.selected + 1).saturating_sub(visible);

        let lines: Vec<Line> = items
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible)
            .map(|(i, item)| {
                let is_selected = i == self.selected;
                let line = Line::from(vec![
                    Span::styled(format!("{}. ", item.label), self.theme.label_style()),
                    Span::styled(item.entry.title.clone(), self.theme.story_style()),
                ]);
                if is_selected {
                    line.style(self.theme.selected_style(self.focused))
                } else {
                    line
                }
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use story_core::HistoryEntry;

    fn render_rows(history: &HistoryLog, selected: usize, height: u16) -> Vec<String> {
        let theme = StoryTheme::default();
        let area = Rect::new(0, 0, 30, height);
        let mut buf = Buffer::empty(area);
        HistoryWidget::new(history, &theme)
            .selected(selected)
            .render(area, &mut buf);
        (0..height)
            .map(|y| (0..30).map(|x| buf[(x, y)].symbol()).collect::<String>())
            .collect()
    }

    fn log(titles: &[&str]) -> HistoryLog {
        let mut log = HistoryLog::new();
        for title in titles {
            log.push_unique(HistoryEntry::new(*title, "body", "Fantasy", Local::now()));
        }
        log
    }

    #[test]
    fn test_empty_history() {
        let rows = render_rows(&HistoryLog::new(), 0, 5);
        assert!(rows[1].contains("No stories yet."));
    }

    #[test]
    fn test_most_recent_first_with_stable_labels() {
        let rows = render_rows(&log(&["First", "Second", "Third"]), 0, 6);
        assert!(rows[1].contains("3. Third"));
        assert!(rows[2].contains("2. Second"));
        assert!(rows[3].contains("1. First"));
    }

    #[test]
    fn test_selection_stays_visible() {
        // two visible rows inside the border
        let rows = render_rows(&log(&["A", "B", "C", "D"]), 3, 4);
        assert!(rows[2].contains("1. A"));
        assert!(rows[1].contains("2. B"));
    }
}
