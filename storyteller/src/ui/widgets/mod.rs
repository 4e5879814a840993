//! TUI widgets for the story writer

pub mod form;
pub mod history;
pub mod input;
pub mod story;

pub use form::FormWidget;
pub use history::HistoryWidget;
pub use input::InputWidget;
pub use story::StoryWidget;
