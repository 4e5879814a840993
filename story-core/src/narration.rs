//! Audio narration of a story body.
//!
//! [`GoogleTts`] uses the public Google Translate speech endpoint, which
//! accepts at most 100 characters per request and answers with MP3 frames.
//! Chunks are fetched in order and their MP3 bytes concatenated.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

/// MIME type of the narration artifact.
pub const AUDIO_MIME: &str = "audio/mpeg";

const TTS_ENDPOINT: &str = "https://translate.google.com/translate_tts";

/// Longest text the speech endpoint accepts per request.
pub const MAX_CHUNK_CHARS: usize = 100;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) storyteller";

#[derive(Debug, Error)]
pub enum NarrationError {
    #[error("nothing to narrate")]
    EmptyText,

    #[error("network error: {0}")]
    Network(String),

    #[error("speech service returned status {status} for chunk {chunk}")]
    Api { status: u16, chunk: usize },
}

/// Text-to-speech backend.
#[async_trait]
pub trait Narrator: Send + Sync {
    /// Render `text` as MP3 bytes.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, NarrationError>;
}

/// [`Narrator`] backed by the Google Translate speech endpoint.
#[derive(Clone)]
pub struct GoogleTts {
    client: reqwest::Client,
    lang: String,
    endpoint: String,
}

impl GoogleTts {
    pub fn new(lang: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            lang: lang.into(),
            endpoint: TTS_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl Narrator for GoogleTts {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, NarrationError> {
        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(NarrationError::EmptyText);
        }

        let total = chunks.len().to_string();
        let mut audio = Vec::new();

        for (idx, chunk) in chunks.iter().enumerate() {
            debug!(idx, total = chunks.len(), "fetching narration chunk");
            let idx_str = idx.to_string();
            let textlen = chunk.chars().count().to_string();

            let response = self
                .client
                .get(&self.endpoint)
                .query(&[
                    ("ie", "UTF-8"),
                    ("client", "tw-ob"),
                    ("tl", self.lang.as_str()),
                    ("q", chunk.as_str()),
                    ("total", total.as_str()),
                    ("idx", idx_str.as_str()),
                    ("textlen", textlen.as_str()),
                ])
                .send()
                .await
                .map_err(|e| NarrationError::Network(e.to_string()))?;

            if !response.status().is_success() {
                return Err(NarrationError::Api {
                    status: response.status().as_u16(),
                    chunk: idx,
                });
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|e| NarrationError::Network(e.to_string()))?;
            audio.extend_from_slice(&bytes);
        }

        Ok(audio)
    }
}

/// Split text into speakable chunks of at most `max_chars` characters.
///
/// Breaks prefer sentence ends, then word boundaries. Only a single word
/// longer than `max_chars` is split mid-word.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();

    for sentence in sentences(text) {
        let mut current = String::new();
        let mut current_len = 0;

        for word in sentence.split_whitespace() {
            let word_len = word.chars().count();

            if word_len > max_chars {
                if !current.is_empty() {
                    chunks.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let chars: Vec<char> = word.chars().collect();
                for piece in chars.chunks(max_chars) {
                    chunks.push(piece.iter().collect());
                }
                continue;
            }

            let needed = if current.is_empty() { word_len } else { word_len + 1 };
            if current_len + needed > max_chars {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if !current.is_empty() {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(word);
            current_len += word_len;
        }

        if !current.is_empty() {
            chunks.push(current);
        }
    }

    chunks
}

/// Split on sentence-ending punctuation and newlines, keeping the punctuation.
fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if matches!(c, '.' | '!' | '?' | '\n') {
            let end = i + c.len_utf8();
            let piece = text[start..end].trim();
            if !piece.is_empty() {
                out.push(piece);
            }
            start = end;
        }
    }
    let rest = text[start..].trim();
    if !rest.is_empty() {
        out.push(rest);
    }
    out
}
