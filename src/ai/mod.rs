//! AI Layer
//!
//! LLM provider abstraction and prompt rendering.

pub mod prompt;
pub mod provider;

pub use provider::{LlmProvider, LlmResponse, OpenAiProvider, SharedProvider, TokenUsage};
