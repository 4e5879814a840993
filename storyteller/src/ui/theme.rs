//! Color themes and styling for the storyteller TUI

use ratatui::style::{Color, Modifier, Style};

/// Which palette is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeKind {
    #[default]
    Dark,
    Light,
}

/// UI color theme
#[derive(Debug, Clone)]
pub struct StoryTheme {
    pub kind: ThemeKind,

    // Base colors
    pub background: Color,
    pub foreground: Color,
    pub border: Color,
    pub border_focused: Color,

    // Text colors
    pub title_text: Color,
    pub story_text: Color,
    pub label_text: Color,
    pub placeholder_text: Color,
    pub input_text: Color,

    // Feedback colors
    pub info_text: Color,
    pub error_text: Color,
    pub selected_bg: Color,
    pub hotkey: Color,
}

impl Default for StoryTheme {
    fn default() -> Self {
        Self::dark()
    }
}

impl StoryTheme {
    pub fn dark() -> Self {
        Self {
            kind: ThemeKind::Dark,
            background: Color::Reset,
            foreground: Color::White,
            border: Color::DarkGray,
            border_focused: Color::Cyan,

            title_text: Color::LightYellow,
            story_text: Color::White,
            label_text: Color::Gray,
            placeholder_text: Color::DarkGray,
            input_text: Color::Cyan,

            info_text: Color::Green,
            error_text: Color::LightRed,
            selected_bg: Color::Rgb(40, 44, 52),
            hotkey: Color::Cyan,
        }
    }

    pub fn light() -> Self {
        Self {
            kind: ThemeKind::Light,
            background: Color::Rgb(250, 248, 240),
            foreground: Color::Black,
            border: Color::Gray,
            border_focused: Color::Blue,

            title_text: Color::Rgb(120, 60, 0),
            story_text: Color::Black,
            label_text: Color::DarkGray,
            placeholder_text: Color::Gray,
            input_text: Color::Blue,

            info_text: Color::Rgb(0, 110, 0),
            error_text: Color::Red,
            selected_bg: Color::Rgb(225, 225, 235),
            hotkey: Color::Blue,
        }
    }

    /// Switch between the dark and light palettes.
    pub fn toggled(&self) -> Self {
        match self.kind {
            ThemeKind::Dark => Self::light(),
            ThemeKind::Light => Self::dark(),
        }
    }

    /// Style for the whole screen background
    pub fn base_style(&self) -> Style {
        Style::default().fg(self.foreground).bg(self.background)
    }

    /// Style for story paragraphs
    pub fn story_style(&self) -> Style {
        Style::default().fg(self.story_text)
    }

    /// Style for the story title
    pub fn story_title_style(&self) -> Style {
        Style::default()
            .fg(self.title_text)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for form field labels
    pub fn label_style(&self) -> Style {
        Style::default().fg(self.label_text)
    }

    /// Style for unselected values and empty fields
    pub fn placeholder_style(&self) -> Style {
        Style::default()
            .fg(self.placeholder_text)
            .add_modifier(Modifier::ITALIC)
    }

    /// Style for typed text
    pub fn input_style(&self) -> Style {
        Style::default().fg(self.input_text)
    }

    pub fn info_style(&self) -> Style {
        Style::default().fg(self.info_text)
    }

    pub fn error_style(&self) -> Style {
        Style::default()
            .fg(self.error_text)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for the highlighted row of a list
    pub fn selected_style(&self, focused: bool) -> Style {
        let style = Style::default().bg(self.selected_bg);
        if focused {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }

    pub fn hotkey_style(&self, enabled: bool) -> Style {
        if enabled {
            Style::default()
                .fg(self.hotkey)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .fg(self.placeholder_text)
                .add_modifier(Modifier::DIM)
        }
    }

    /// Get border style
    pub fn border_style(&self, focused: bool) -> Style {
        Style::default().fg(if focused {
            self.border_focused
        } else {
            self.border
        })
    }
}
