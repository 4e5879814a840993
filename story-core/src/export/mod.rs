//! Document exporters.
//!
//! Both exporters are pure: the same title and body always produce the same
//! bytes, with no timestamps embedded.

pub mod docx;
pub mod pdf;

use thiserror::Error;

pub use docx::export_docx;
pub use pdf::export_pdf;

/// Errors from rendering or writing an export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// A downloadable artifact kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Docx,
    Mp3,
}

impl ExportFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Mp3 => crate::narration::AUDIO_MIME,
        }
    }

    /// File name for the artifact. PDF and MP3 use fixed names and are
    /// overwritten by repeated exports; DOCX is named after the title.
    pub fn file_name(self, title: &str) -> String {
        match self {
            ExportFormat::Pdf => "your_story.pdf".to_string(),
            ExportFormat::Mp3 => "story.mp3".to_string(),
            ExportFormat::Docx => format!("{}.docx", safe_file_stem(title)),
        }
    }
}

/// Make a title usable as a file name on every platform.
fn safe_file_stem(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let stem = stem.trim().trim_matches('.').trim();
    if stem.is_empty() {
        "story".to_string()
    } else {
        stem.to_string()
    }
}
