//! Text generation seam.
//!
//! The workflow talks to a [`TextGenerator`]; the production implementation
//! forwards to OpenRouter, tests use [`crate::testing::MockGenerator`].

use async_trait::async_trait;
use openrouter::{Message, OpenRouter, Request};
use thiserror::Error;

use crate::prompts::SYSTEM_PROMPT;

/// Text substituted for generated output when a generator call fails.
pub const FAILURE_MARKER: &str = "[ERROR]";

/// Tokens added to every budget so the closing sentence is not truncated.
pub const TOKEN_OVERHEAD: usize = 30;

/// Sampling temperature for every request.
pub const TEMPERATURE: f32 = 0.7;

/// Why a generator call produced no text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerateError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl From<openrouter::Error> for GenerateError {
    fn from(err: openrouter::Error) -> Self {
        match err {
            openrouter::Error::Parse(msg) => GenerateError::MalformedResponse(msg),
            other => GenerateError::Transport(other.to_string()),
        }
    }
}

/// Single-shot prompt-to-text backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for `prompt` using at most `max_tokens` tokens.
    ///
    /// `max_tokens` already includes [`TOKEN_OVERHEAD`].
    async fn generate(&self, prompt: &str, max_tokens: usize) -> Result<String, GenerateError>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// [`TextGenerator`] backed by the OpenRouter chat-completions API.
pub struct OpenRouterGenerator {
    client: OpenRouter,
}

impl OpenRouterGenerator {
    pub fn new(client: OpenRouter) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TextGenerator for OpenRouterGenerator {
    async fn generate(&self, prompt: &str, max_tokens: usize) -> Result<String, GenerateError> {
        let request = Request::new(vec![Message::user(prompt)])
            .with_system(SYSTEM_PROMPT)
            .with_temperature(TEMPERATURE)
            .with_max_tokens(max_tokens);

        let response = self.client.complete(request).await?;
        Ok(response.text().to_string())
    }

    fn name(&self) -> &str {
        self.client.model()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        let parse: GenerateError = openrouter::Error::Parse("no choices".into()).into();
        assert_eq!(parse, GenerateError::MalformedResponse("no choices".into()));

        let api: GenerateError = openrouter::Error::Api {
            status: 502,
            message: "bad gateway".into(),
        }
        .into();
        assert!(matches!(api, GenerateError::Transport(msg) if msg.contains("502")));

        let net: GenerateError = openrouter::Error::Network("refused".into()).into();
        assert!(matches!(net, GenerateError::Transport(_)));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_failure() {
        let client = OpenRouter::new("k").with_endpoint("http://127.0.0.1:1/chat/completions");
        let generator = OpenRouterGenerator::new(client);
        let err = generator.generate("hello", 10).await.unwrap_err();
        assert!(matches!(err, GenerateError::Transport(_)));
    }
}
