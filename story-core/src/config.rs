//! Process-level configuration, read once at start-up.

use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_EXPORT_DIR: &str = "exports";
pub const DEFAULT_TTS_LANG: &str = "en";
pub const DEFAULT_LOG_FILTER: &str = "storyteller=info,story_core=info,openrouter=info";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("API_KEY environment variable not set")]
    MissingApiKey,

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Settings supplied through the environment (or a `.env` file).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
    pub referer: String,
    pub export_dir: PathBuf,
    pub tts_lang: String,
    pub log_filter: String,
}

impl AppConfig {
    /// Read configuration from process environment variables.
    ///
    /// Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("API_KEY").ok_or(ConfigError::MissingApiKey)?;

        let endpoint = get("OPENROUTER_API_URL")
            .unwrap_or_else(|| openrouter::DEFAULT_ENDPOINT.to_string());
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            return Err(ConfigError::Invalid {
                var: "OPENROUTER_API_URL",
                reason: format!("'{endpoint}' is not an http(s) URL"),
            });
        }

        let tts_lang = get("STORY_TTS_LANG").unwrap_or_else(|| DEFAULT_TTS_LANG.to_string());
        if !tts_lang.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(ConfigError::Invalid {
                var: "STORY_TTS_LANG",
                reason: format!("'{tts_lang}' is not a language code"),
            });
        }

        Ok(Self {
            api_key: api_key.trim().to_string(),
            endpoint,
            model: get("OPENROUTER_MODEL").unwrap_or_else(|| openrouter::DEFAULT_MODEL.to_string()),
            referer: get("OPENROUTER_REFERER")
                .unwrap_or_else(|| openrouter::DEFAULT_REFERER.to_string()),
            export_dir: get("STORY_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_DIR)),
            tts_lang,
            log_filter: get("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }

    /// Directory for log files.
    pub fn log_dir(&self) -> PathBuf {
        self.export_dir.join("logs")
    }

    /// The OpenRouter client described by this configuration.
    pub fn openrouter_client(&self) -> openrouter::OpenRouter {
        openrouter::OpenRouter::new(&self.api_key)
            .with_endpoint(&self.endpoint)
            .with_model(&self.model)
            .with_referer(&self.referer)
    }
}
