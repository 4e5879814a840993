//! Form selections that steer story generation.
//!
//! Each dropdown on the form is a closed set of options. A field the user
//! has not picked yet is `None` and rendered with its placeholder text.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::workflow::WorkflowError;

/// A closed set of options shown as one form dropdown.
pub trait Choice: Copy + Eq + Sized + 'static {
    /// Every option, in display order.
    const ALL: &'static [Self];

    /// Text shown while nothing is selected.
    const PLACEHOLDER: &'static str;

    /// Human-readable label, used verbatim in prompts.
    fn label(self) -> &'static str;

    /// Step to the next option, wrapping through "unselected".
    fn cycle(current: Option<Self>, forward: bool) -> Option<Self> {
        let len = Self::ALL.len();
        let position = current.and_then(|c| Self::ALL.iter().position(|o| *o == c));
        match (position, forward) {
            (None, true) => Self::ALL.first().copied(),
            (None, false) => Self::ALL.last().copied(),
            (Some(i), true) if i + 1 < len => Some(Self::ALL[i + 1]),
            (Some(_), true) => None,
            (Some(0), false) => None,
            (Some(i), false) => Some(Self::ALL[i - 1]),
        }
    }

    /// Display text for an optional selection.
    fn display(current: Option<Self>) -> &'static str {
        current.map(Self::label).unwrap_or(Self::PLACEHOLDER)
    }
}

/// Error returned when parsing an option label fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {field} '{value}'")]
pub struct ParseChoiceError {
    pub field: &'static str,
    pub value: String,
}

macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal, $placeholder:literal {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl Choice for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];
            const PLACEHOLDER: &'static str = $placeholder;

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = ParseChoiceError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = normalize(s);
                Self::ALL
                    .iter()
                    .copied()
                    .find(|option| normalize(option.label()) == wanted)
                    .ok_or_else(|| ParseChoiceError {
                        field: $field,
                        value: s.to_string(),
                    })
            }
        }
    };
}

/// Lowercase and drop separators so "space-station" matches "Space Station".
fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .map(|c| if c == 'é' { 'e' } else { c })
        .collect()
}

choice_enum! {
    /// Story genre.
    Genre, "genre", "Select a genre" {
        Fantasy => "Fantasy",
        SciFi => "Sci-Fi",
        Romance => "Romance",
        Mystery => "Mystery",
        Comedy => "Comedy",
        Horror => "Horror",
    }
}

choice_enum! {
    /// Where the story takes place.
    Setting, "setting", "Select a setting" {
        Bookstore => "Bookstore",
        Town => "Town",
        Village => "Village",
        Party => "Party",
        Forest => "Forest",
        Cafe => "Café",
        Castle => "Castle",
        SpaceStation => "Space Station",
        Island => "Island",
        Unknown => "Unknown",
    }
}

choice_enum! {
    /// Overall tone of the story.
    Mood, "story tone", "Select a story tone" {
        Light => "Light",
        Whimsical => "Whimsical",
        Mysterious => "Mysterious",
        Dramatic => "Dramatic",
        Dark => "Dark",
    }
}

choice_enum! {
    /// How the main character feels.
    Emotion, "character emotion", "Select your character emotion" {
        Neutral => "Neutral",
        Happy => "Happy",
        Nervous => "Nervous",
        Confident => "Confident",
        Sad => "Sad",
        Angry => "Angry",
        Excited => "Excited",
        Scared => "Scared",
    }
}

/// Requested length of each generated passage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LengthTier {
    Short,
    #[default]
    Medium,
    Long,
}

impl LengthTier {
    pub const ALL: [LengthTier; 3] = [LengthTier::Short, LengthTier::Medium, LengthTier::Long];

    /// Generator-side token budget, before the call overhead is added.
    pub fn token_budget(self) -> usize {
        match self {
            LengthTier::Short => 300,
            LengthTier::Medium => 600,
            LengthTier::Long => 800,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LengthTier::Short => "Short",
            LengthTier::Medium => "Medium",
            LengthTier::Long => "Long",
        }
    }

    pub fn cycle(self, forward: bool) -> Self {
        let i = Self::ALL.iter().position(|t| *t == self).unwrap_or(1);
        let next = if forward { i + 1 } else { i + Self::ALL.len() - 1 };
        Self::ALL[next % Self::ALL.len()]
    }
}

impl fmt::Display for LengthTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LengthTier {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" => Ok(LengthTier::Short),
            "medium" => Ok(LengthTier::Medium),
            "long" => Ok(LengthTier::Long),
            _ => Err(ParseChoiceError {
                field: "length",
                value: s.to_string(),
            }),
        }
    }
}

/// Current values of every form control.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSelections {
    pub genre: Option<Genre>,
    /// Optional; blank means the model picks the protagonist.
    pub character: String,
    pub setting: Option<Setting>,
    pub mood: Option<Mood>,
    pub emotion: Option<Emotion>,
    pub opening_line: String,
    pub length: LengthTier,
}

impl FormSelections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_genre(mut self, genre: Genre) -> Self {
        self.genre = Some(genre);
        self
    }

    pub fn with_character(mut self, name: impl Into<String>) -> Self {
        self.character = name.into();
        self
    }

    pub fn with_setting(mut self, setting: Setting) -> Self {
        self.setting = Some(setting);
        self
    }

    pub fn with_mood(mut self, mood: Mood) -> Self {
        self.mood = Some(mood);
        self
    }

    pub fn with_emotion(mut self, emotion: Emotion) -> Self {
        self.emotion = Some(emotion);
        self
    }

    pub fn with_opening_line(mut self, line: impl Into<String>) -> Self {
        self.opening_line = line.into();
        self
    }

    pub fn with_length(mut self, length: LengthTier) -> Self {
        self.length = length;
        self
    }

    /// Genre label for history records; empty while unselected.
    pub fn genre_label(&self) -> String {
        self.genre.map(|g| g.label().to_string()).unwrap_or_default()
    }

    /// Resolve everything the opening generation needs.
    pub fn opening_params(&self) -> Result<OpeningParams<'_>, WorkflowError> {
        let mut missing = Vec::new();
        if self.opening_line.trim().is_empty() {
            missing.push("opening line");
        }
        if self.genre.is_none() {
            missing.push("genre");
        }
        if self.setting.is_none() {
            missing.push("setting");
        }
        if self.mood.is_none() {
            missing.push("story tone");
        }
        if self.emotion.is_none() {
            missing.push("character emotion");
        }

        match (self.genre, self.setting, self.mood, self.emotion) {
            (Some(genre), Some(setting), Some(mood), Some(emotion)) if missing.is_empty() => {
                Ok(OpeningParams {
                    genre,
                    setting,
                    mood,
                    emotion,
                    character: non_blank(&self.character),
                    opening_line: self.opening_line.trim(),
                    length: self.length,
                })
            }
            _ => Err(WorkflowError::IncompleteForm(missing)),
        }
    }

    /// Resolve everything a continuation needs.
    pub fn continuation_params(&self) -> Result<ContinuationParams, WorkflowError> {
        let mut missing = Vec::new();
        if self.genre.is_none() {
            missing.push("genre");
        }
        if self.mood.is_none() {
            missing.push("story tone");
        }
        if self.emotion.is_none() {
            missing.push("character emotion");
        }

        match (self.genre, self.mood, self.emotion) {
            (Some(genre), Some(mood), Some(emotion)) => Ok(ContinuationParams {
                genre,
                mood,
                emotion,
                length: self.length,
            }),
            _ => Err(WorkflowError::IncompleteForm(missing)),
        }
    }
}

fn non_blank(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Validated inputs for the opening generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpeningParams<'a> {
    pub genre: Genre,
    pub setting: Setting,
    pub mood: Mood,
    pub emotion: Emotion,
    pub character: Option<&'a str>,
    pub opening_line: &'a str,
    pub length: LengthTier,
}

/// Validated inputs for a continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContinuationParams {
    pub genre: Genre,
    pub mood: Mood,
    pub emotion: Emotion,
    pub length: LengthTier,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_budgets() {
        assert_eq!(LengthTier::Short.token_budget(), 300);
        assert_eq!(LengthTier::Medium.token_budget(), 600);
        assert_eq!(LengthTier::Long.token_budget(), 800);
        assert_eq!(LengthTier::default(), LengthTier::Medium);
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!("sci-fi".parse::<Genre>().unwrap(), Genre::SciFi);
        assert_eq!("Café".parse::<Setting>().unwrap(), Setting::Cafe);
        assert_eq!("cafe".parse::<Setting>().unwrap(), Setting::Cafe);
        assert_eq!("space station".parse::<Setting>().unwrap(), Setting::SpaceStation);
        assert_eq!("LONG".parse::<LengthTier>().unwrap(), LengthTier::Long);

        let err = "western".parse::<Genre>().unwrap_err();
        assert_eq!(err.field, "genre");
    }

    #[test]
    fn test_cycle_wraps_through_unselected() {
        assert_eq!(Mood::cycle(None, true), Some(Mood::Light));
        assert_eq!(Mood::cycle(Some(Mood::Dark), true), None);
        assert_eq!(Mood::cycle(None, false), Some(Mood::Dark));
        assert_eq!(Mood::cycle(Some(Mood::Light), false), None);
        assert_eq!(Mood::display(None), "Select a story tone");
        assert_eq!(LengthTier::Long.cycle(true), LengthTier::Short);
        assert_eq!(LengthTier::Short.cycle(false), LengthTier::Long);
    }

    #[test]
    fn test_opening_params_reports_missing_fields() {
        let form = FormSelections::new().with_genre(Genre::Horror);
        match form.opening_params() {
            Err(WorkflowError::IncompleteForm(missing)) => {
                assert_eq!(
                    missing,
                    vec!["opening line", "setting", "story tone", "character emotion"]
                );
            }
            other => panic!("expected incomplete form, got {other:?}"),
        }
    }

    #[test]
    fn test_opening_params_trims_inputs() {
        let form = FormSelections::new()
            .with_genre(Genre::Fantasy)
            .with_setting(Setting::Forest)
            .with_mood(Mood::Light)
            .with_emotion(Emotion::Happy)
            .with_character("   ")
            .with_opening_line("  The wind rose.  ");

        let params = form.opening_params().unwrap();
        assert_eq!(params.opening_line, "The wind rose.");
        assert_eq!(params.character, None);
    }

    #[test]
    fn test_continuation_params_ignore_opening_line() {
        let form = FormSelections::new()
            .with_genre(Genre::Mystery)
            .with_mood(Mood::Dark)
            .with_emotion(Emotion::Sad);
        assert!(form.continuation_params().is_ok());
        assert!(form.opening_params().is_err());
    }
}
