//! LLM provider trait definition.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Options for a generation request.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

/// Errors that can occur when interacting with an LLM provider.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request timeout")]
    Timeout,
}

impl LlmError {
    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            LlmError::Connection(_) => "connection",
            LlmError::Api { .. } => "api",
            LlmError::InvalidResponse(_) => "invalid_response",
            LlmError::Timeout => "timeout",
        }
    }
}

/// Trait for LLM providers.
///
/// Implementations connect to a text generation backend and return the raw
/// completion text. Interpreting that text is up to the caller.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider's name (e.g., "ollama").
    fn name(&self) -> &str;

    /// Get the model being used.
    fn model(&self) -> &str;

    /// Generate a completion for a single prompt.
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String, LlmError>;

    /// Check if the provider is healthy and reachable.
    async fn health_check(&self) -> Result<(), LlmError>;
}
