//! Story form widget: one row per field

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use story_core::{Choice, Emotion, FormSelections, Genre, Mood, Setting};

use crate::app::FormField;
use crate::ui::theme::StoryTheme;

const LABEL_WIDTH: usize = 13;

/// Widget showing the current form selections
pub struct FormWidget<'a> {
    form: &'a FormSelections,
    theme: &'a StoryTheme,
    selected: FormField,
    focused: bool,
    editing: bool,
}

impl<'a> FormWidget<'a> {
    pub fn new(form: &'a FormSelections, theme: &'a StoryTheme) -> Self {
        Self {
            form,
            theme,
            selected: FormField::default(),
            focused: false,
            editing: false,
        }
    }

    pub fn selected(mut self, field: FormField) -> Self {
        self.selected = field;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn editing(mut self, editing: bool) -> Self {
        self.editing = editing;
        self
    }

    /// Display text for a field and whether it holds a real value.
    fn value(&self, field: FormField) -> (String, bool) {
        let form = self.form;
        match field {
            FormField::Genre => choice_value(form.genre),
            FormField::Setting => choice_value(form.setting),
            FormField::Mood => choice_value(form.mood),
            FormField::Emotion => choice_value(form.emotion),
            FormField::Length => (form.length.label().to_string(), true),
            FormField::Character => text_value(&form.character, "(optional)"),
            FormField::OpeningLine => text_value(&form.opening_line, "Type your opening line"),
        }
    }
}

fn choice_value<C: Choice>(current: Option<C>) -> (String, bool) {
    (C::display(current).to_string(), current.is_some())
}

fn text_value(text: &str, placeholder: &str) -> (String, bool) {
    if text.trim().is_empty() {
        (placeholder.to_string(), false)
    } else {
        (text.to_string(), true)
    }
}

impl Widget for FormWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = if self.focused {
            " Your Story [h/l change, i edit] "
        } else {
            " Your Story "
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.focused));

        let mut lines: Vec<Line> = Vec::new();
        for field in FormField::ALL {
            let is_selected = field == self.selected;
            let (value, is_set) = self.value(field);

            let marker = if is_selected && self.focused { "▸ " } else { "  " };
            let value_style = if is_set {
                self.theme.input_style()
            } else {
                self.theme.placeholder_style()
            };

            let value = if field.is_text() || !is_selected || !self.focused {
                value
            } else {
                format!("‹ {value} ›")
            };

            let mut line = Line::from(vec![
                Span::styled(marker, self.theme.hotkey_style(true)),
                Span::styled(
                    format!("{:<width$}", field.label(), width = LABEL_WIDTH),
                    self.theme.label_style(),
                ),
                Span::styled(value, value_style),
            ]);
            if is_selected {
                line = line.style(self.theme.selected_style(self.focused));
            }
            if is_selected && self.editing {
                line.push_span(Span::styled(" ✎", self.theme.hotkey_style(true)));
            }
            lines.push(line);
            lines.push(Line::from(""));
        }

        // Options of the focused dropdown
        if self.focused && !self.selected.is_text() {
            let options = match self.selected {
                FormField::Genre => option_list::<Genre>(),
                FormField::Setting => option_list::<Setting>(),
                FormField::Mood => option_list::<Mood>(),
                FormField::Emotion => option_list::<Emotion>(),
                _ => "Short, Medium, Long".to_string(),
            };
            lines.push(Line::from(Span::styled(
                options,
                self.theme.placeholder_style(),
            )));
        }

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

fn option_list<C: Choice>() -> String {
    C::ALL
        .iter()
        .map(|option| option.label())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_to_string(widget: FormWidget<'_>) -> String {
        let area = Rect::new(0, 0, 50, 20);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_placeholders_for_empty_form() {
        let form = FormSelections::default();
        let theme = StoryTheme::default();
        let out = render_to_string(FormWidget::new(&form, &theme));
        assert!(out.contains("Select a genre"));
        assert!(out.contains("Select your character emotion"));
        assert!(out.contains("Medium"));
    }

    #[test]
    fn test_selected_values_shown() {
        let form = FormSelections::new()
            .with_genre(Genre::SciFi)
            .with_setting(Setting::SpaceStation);
        let theme = StoryTheme::default();
        let out = render_to_string(
            FormWidget::new(&form, &theme)
                .selected(FormField::Genre)
                .focused(true),
        );
        assert!(out.contains("‹ Sci-Fi ›"));
        assert!(out.contains("Space Station"));
    }
}
