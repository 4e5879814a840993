//! The live story and the session's archive of finished stories.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Separator placed between paragraphs of a story body.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// The story currently on screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryState {
    pub title: String,
    pub body: String,
    /// Set while a "continue" request is waiting to be processed.
    pub awaiting_continuation: bool,
}

impl StoryState {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            awaiting_continuation: false,
        }
    }

    /// True when there is no story body to show.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Append a paragraph, separated from the existing body by a blank line.
    pub fn push_paragraph(&mut self, paragraph: &str) {
        if !self.body.is_empty() {
            self.body.push_str(PARAGRAPH_SEPARATOR);
        }
        self.body.push_str(paragraph.trim());
    }

    /// Blank-line-delimited blocks of the body.
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> + '_ {
        self.body
            .split(PARAGRAPH_SEPARATOR)
            .filter(|p| !p.trim().is_empty())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// A finished story archived by "Start Over".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub title: String,
    pub story: String,
    pub genre: String,
    pub created_at: DateTime<Local>,
}

impl HistoryEntry {
    pub fn new(
        title: impl Into<String>,
        story: impl Into<String>,
        genre: impl Into<String>,
        created_at: DateTime<Local>,
    ) -> Self {
        Self {
            title: title.into(),
            story: story.into(),
            genre: genre.into(),
            created_at,
        }
    }
}

/// One row of the history list as displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryItem<'a> {
    /// 1-based position in append order; stable regardless of display order.
    pub label: usize,
    pub entry: &'a HistoryEntry,
}

impl HistoryItem<'_> {
    pub fn caption(&self) -> String {
        format!("{}. {}", self.label, self.entry.title)
    }
}

/// Append-only log of archived stories, unique by title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry unless one with the same title already exists.
    ///
    /// Returns `true` if the entry was appended.
    pub fn push_unique(&mut self, entry: HistoryEntry) -> bool {
        if self.contains_title(&entry.title) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn contains_title(&self, title: &str) -> bool {
        self.entries.iter().any(|e| e.title == title)
    }

    /// Look up an entry by its 1-based label.
    pub fn get(&self, label: usize) -> Option<&HistoryEntry> {
        label.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in append order.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Entries most recent first, each carrying its append-order label.
    pub fn display_items(&self) -> Vec<HistoryItem<'_>> {
        self.entries
            .iter()
            .enumerate()
            .rev()
            .map(|(i, entry)| HistoryItem {
                label: i + 1,
                entry,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str) -> HistoryEntry {
        HistoryEntry::new(title, format!("{title} body"), "Fantasy", Local::now())
    }

    #[test]
    fn test_push_paragraph() {
        let mut story = StoryState::default();
        story.push_paragraph("  First.  ");
        story.push_paragraph("Second.");
        assert_eq!(story.body, "First.\n\nSecond.");
        assert_eq!(story.paragraphs().collect::<Vec<_>>(), vec!["First.", "Second."]);
    }

    #[test]
    fn test_clear_resets_flag() {
        let mut story = StoryState::new("T", "B");
        story.awaiting_continuation = true;
        story.clear();
        assert_eq!(story, StoryState::default());
        assert!(story.is_empty());
    }

    #[test]
    fn test_duplicate_title_is_dropped() {
        let mut log = HistoryLog::new();
        assert!(log.push_unique(entry("The Lantern")));
        assert!(log.push_unique(entry("Ashes")));

        let mut dup = entry("The Lantern");
        dup.story = "different text".to_string();
        assert!(!log.push_unique(dup));

        assert_eq!(log.len(), 2);
        assert_eq!(log.get(1).unwrap().story, "The Lantern body");
    }

    #[test]
    fn test_display_items_keep_append_labels() {
        let mut log = HistoryLog::new();
        log.push_unique(entry("One"));
        log.push_unique(entry("Two"));
        log.push_unique(entry("Three"));

        let captions: Vec<String> = log.display_items().iter().map(|i| i.caption()).collect();
        assert_eq!(captions, vec!["3. Three", "2. Two", "1. One"]);

        // append order is untouched by the display transform
        let titles: Vec<&str> = log.entries().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["One", "Two", "Three"]);
    }

    #[test]
    fn test_get_by_label() {
        let mut log = HistoryLog::new();
        log.push_unique(entry("Only"));
        assert!(log.get(0).is_none());
        assert_eq!(log.get(1).unwrap().title, "Only");
        assert!(log.get(2).is_none());
    }
}
