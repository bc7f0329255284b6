//! Errors surfaced by the reply loop and title generator.

use thiserror::Error;

use acai_providers::ProviderError;

use crate::cancel::Interrupted;

/// Terminal failure of a reply or title request.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("conversation has no messages")]
    EmptyConversation,

    #[error("no choices returned by the model")]
    NoModelChoices,

    /// The model answered with blank text where text was required.
    #[error("empty response from the model")]
    EmptyModelResponse,

    #[error("too many tool calls, unable to generate reply (limit {limit})")]
    TooManyToolCalls { limit: u32 },

    #[error("model call failed: {0}")]
    Model(#[from] ProviderError),

    #[error("request cancelled")]
    Cancelled,

    #[error("request deadline exceeded")]
    DeadlineExceeded,
}

impl From<Interrupted> for AssistantError {
    fn from(value: Interrupted) -> Self {
        match value {
            Interrupted::Cancelled => AssistantError::Cancelled,
            Interrupted::DeadlineExceeded => AssistantError::DeadlineExceeded,
        }
    }
}
