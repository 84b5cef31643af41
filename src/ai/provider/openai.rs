//! OpenAI-Compatible API Provider
//!
//! LLM provider using the Chat Completions API of any OpenAI-compatible
//! endpoint. Transient failures (429, 502, 503, 504, transport errors) are
//! retried with exponential backoff before surfacing as a single error.

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{LlmProvider, LlmResponse, TokenUsage};
use crate::config::LlmConfig;
use crate::constants::network;
use crate::types::{DocError, Result};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

const SYSTEM_PROMPT: &str = "You are a senior software engineer producing \
repository documentation. Respond with well-structured markdown only, no \
surrounding commentary.";

/// OpenAI-compatible provider with secure API key handling
pub struct OpenAiProvider {
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

/// Error of a single HTTP attempt, carrying its retry decision
struct AttemptError {
    retryable: bool,
    message: String,
}

impl std::fmt::Display for AttemptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl OpenAiProvider {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key_str = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                DocError::Config(
                    "LLM API key not found. Set DOCSMITH_LLM__API_KEY or OPENAI_API_KEY"
                        .to_string(),
                )
            })?;

        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DocError::LlmApi(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: SecretString::from(api_key_str),
            api_base,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    fn build_request(&self, prompt: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
        }
    }

    async fn attempt(
        &self,
        request: &ChatCompletionRequest,
    ) -> std::result::Result<ChatCompletionResponse, AttemptError> {
        let url = format!("{}/chat/completions", self.api_base);

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(request)
            .send()
            .await
            .map_err(|e| AttemptError {
                // Connect/timeout errors are transport-level and worth retrying
                retryable: true,
                message: format!("request failed: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let retryable = matches!(status.as_u16(), 429 | 502 | 503 | 504);
            let body = response.text().await.unwrap_or_default();
            return Err(AttemptError {
                retryable,
                message: format!("API returned {}: {}", status, truncate(&body, 300)),
            });
        }

        response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| AttemptError {
                retryable: false,
                message: format!("failed to parse response: {}", e),
            })
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn generate(&self, prompt: &str) -> Result<LlmResponse> {
        info!(
            "Generating with {} (temperature: {})",
            self.model, self.temperature
        );

        let request = self.build_request(prompt);

        let parsed = (|| async { self.attempt(&request).await })
            .retry(
                ExponentialBuilder::default()
                    .with_max_times(network::MAX_RETRY_ATTEMPTS)
                    .with_max_delay(Duration::from_secs(60)),
            )
            .when(|e: &AttemptError| e.retryable)
            .notify(|e, delay| {
                warn!("Retrying LLM request in {:?}: {}", delay, e);
            })
            .await
            .map_err(|e| DocError::LlmApi(e.message))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| DocError::LlmApi("response contained no choices".to_string()))?;

        let usage = parsed
            .usage
            .map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        debug!(
            "LLM call complete: {} input / {} output tokens",
            usage.input_tokens, usage.output_tokens
        );

        Ok(LlmResponse {
            content,
            usage,
            model: self.model.clone(),
            provider: "openai".to_string(),
        })
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    usage: Option<UsagePayload>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct UsagePayload {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> LlmConfig {
        LlmConfig {
            api_key: Some("sk-test".to_string()),
            ..LlmConfig::default()
        }
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let provider = OpenAiProvider::new(&test_config()).unwrap();
        let debug = format!("{:?}", provider);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("sk-test"));
    }

    #[test]
    fn test_request_carries_model_and_prompt() {
        let provider = OpenAiProvider::new(&test_config()).unwrap();
        let request = provider.build_request("Analyze this repository");
        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[1].content, "Analyze this repository");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("hello", 3), "hel");
        assert_eq!(truncate("hi", 10), "hi");
    }
}
