//! LLM provider abstraction layer.
//!
//! The mood classifier only needs single-shot text generation, so the
//! provider surface is one `generate` call plus a health probe.

mod ollama;
mod provider;

pub use ollama::OllamaProvider;
pub use provider::{GenerateOptions, LlmError, LlmProvider};
