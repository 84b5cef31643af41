//! LLM Provider Abstraction
//!
//! Defines the LlmProvider trait consumed by the orchestrator. The concrete
//! provider is an opaque remote call: markdown in response to rendered
//! instructions, plus token usage metrics passed through to task outcomes.
//! Timeouts are enforced here (HTTP client ceiling), not by callers.

mod openai;

pub use openai::OpenAiProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::types::Result;

// =============================================================================
// LLM Response with Usage Metrics
// =============================================================================

/// Complete LLM response including content and usage metrics
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Generated markdown content
    pub content: String,
    /// Token usage metrics
    pub usage: TokenUsage,
    /// Model used
    pub model: String,
    /// Provider name
    pub provider: String,
}

/// Token usage metrics, pass-through metadata from the remote call
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Input tokens (prompt)
    pub input_tokens: u32,
    /// Output tokens (response)
    pub output_tokens: u32,
}

impl TokenUsage {
    /// Total tokens used (input + output)
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// Shared LLM provider type for concurrent access across tasks.
pub type SharedProvider = Arc<dyn LlmProvider>;

// =============================================================================
// LLM Provider Trait
// =============================================================================

/// LLM Provider trait for documentation generation with usage metrics.
///
/// Implementations own their retry and timeout behavior; a failure surfaces
/// as a single `DocError::LlmApi` to the caller.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate markdown from rendered instructions.
    ///
    /// Returns `LlmResponse` containing both the content and usage metrics.
    async fn generate(&self, prompt: &str) -> Result<LlmResponse>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;
}
