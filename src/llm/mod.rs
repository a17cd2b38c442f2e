//! OpenAI-compatible LLM access
//!
//! A thin client over the chat completions and responses endpoints. The
//! research providers in `agents` build on it.

mod client;
mod types;

pub use client::LlmClient;
pub use types::{ChatMessage, OutputSchema};

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LlmError>;

/// Errors that can occur during LLM calls
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("No API key configured; set OPENAI_API_KEY")]
    MissingApiKey,

    #[error("Invalid LLM settings: {0}")]
    InvalidSettings(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            LlmError::Parse(err.to_string())
        } else {
            LlmError::Network(err.to_string())
        }
    }
}
