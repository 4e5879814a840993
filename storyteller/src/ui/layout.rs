//! Screen layout for the storyteller TUI

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Width of the form column.
const FORM_WIDTH: u16 = 40;
/// Width of the history column.
const HISTORY_WIDTH: u16 = 30;

/// Areas of the main screen.
#[derive(Debug, Clone, Copy)]
pub struct AppLayout {
    pub title_area: Rect,
    pub form_area: Rect,
    pub story_area: Rect,
    pub history_area: Rect,
    pub input_area: Rect,
    pub status_bar: Rect,
    pub hotkey_bar: Rect,
}

impl AppLayout {
    pub fn calculate(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // title
                Constraint::Min(8),    // panels
                Constraint::Length(3), // input
                Constraint::Length(1), // status
                Constraint::Length(1), // hotkeys
            ])
            .split(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(FORM_WIDTH),
                Constraint::Min(20),
                Constraint::Length(HISTORY_WIDTH),
            ])
            .split(rows[1]);

        Self {
            title_area: rows[0],
            form_area: columns[0],
            story_area: columns[1],
            history_area: columns[2],
            input_area: rows[2],
            status_bar: rows[3],
            hotkey_bar: rows[4],
        }
    }
}

/// A `width` x `height` rectangle centered in `area`, clamped to fit.
pub fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_fills_width() {
        let layout = AppLayout::calculate(Rect::new(0, 0, 120, 40));
        assert_eq!(layout.form_area.width, FORM_WIDTH);
        assert_eq!(layout.history_area.width, HISTORY_WIDTH);
        assert_eq!(layout.story_area.width, 120 - FORM_WIDTH - HISTORY_WIDTH);
        assert_eq!(layout.hotkey_bar.y, 39);
    }

    #[test]
    fn test_centered_rect_clamps() {
        let rect = centered_rect_fixed(50, 30, Rect::new(0, 0, 40, 20));
        assert_eq!(rect, Rect::new(0, 0, 40, 20));

        let rect = centered_rect_fixed(10, 4, Rect::new(0, 0, 40, 20));
        assert_eq!(rect, Rect::new(15, 8, 10, 4));
    }
}
