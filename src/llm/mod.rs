// src/llm/mod.rs

pub mod gemini;
pub mod parse;
pub mod prompts;

use std::fmt;

use async_trait::async_trait;

pub use gemini::GeminiProvider;

/// One fully formatted prompt for the provider.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
}

#[derive(Debug)]
pub enum LlmError {
    /// Transport failure or non-success HTTP status.
    Request(String),
    /// The provider answered but the body was not what we expected.
    InvalidResponse(String),
    /// The provider returned no text.
    EmptyCompletion,
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::Request(msg) => write!(f, "provider request failed: {}", msg),
            LlmError::InvalidResponse(msg) => write!(f, "invalid provider response: {}", msg),
            LlmError::EmptyCompletion => write!(f, "provider returned an empty completion"),
        }
    }
}

impl std::error::Error for LlmError {}

/// A text-generation backend. Called once per request; no retries.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}
