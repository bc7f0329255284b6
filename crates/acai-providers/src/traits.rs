//! LLM Provider trait — the model capability.
//!
//! Submit a message list plus tool schema, receive either a final answer or a
//! set of requested tool invocations. Retries, if any, belong behind this
//! trait; callers see one attempt.

use async_trait::async_trait;
use acai_core::types::{LlmResponse, Message, ToolDefinition};

/// Configuration passed to each LLM call.
#[derive(Clone, Debug)]
pub struct LlmRequestConfig {
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0). `None` uses the provider default.
    pub temperature: Option<f64>,
}

impl Default for LlmRequestConfig {
    fn default() -> Self {
        Self {
            max_tokens: 4096,
            temperature: None,
        }
    }
}

/// Failure of the model capability itself.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The request never produced an HTTP response (DNS, connect, timeout).
    #[error("model request failed: {0}")]
    Transport(String),
    /// The API answered with a non-success status.
    #[error("model API returned {status}: {body}")]
    Status { status: u16, body: String },
    /// The response body was not a chat completion.
    #[error("failed to decode model response: {0}")]
    Decode(String),
    /// The provider is not usable as configured.
    #[error("model provider misconfigured: {0}")]
    Config(String),
}

/// Trait that all LLM providers must implement.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a chat completion request.
    ///
    /// # Arguments
    /// * `messages` — Conversation so far in OpenAI format.
    /// * `tools`    — Tool definitions the LLM may call (`None` disables tools).
    /// * `model`    — Model identifier (e.g. `"gpt-4.1"`).
    /// * `config`   — Temperature, max_tokens, etc.
    ///
    /// # Returns
    /// Every choice the API produced, or the error that prevented a response.
    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        model: &str,
        config: &LlmRequestConfig,
    ) -> Result<LlmResponse, ProviderError>;

    /// The default model for this provider instance.
    fn default_model(&self) -> &str;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
