//! LLM provider layer for Acai.
//!
//! # Architecture
//!
//! - [`traits::LlmProvider`] — the model capability the reply loop consumes
//! - [`http_provider::HttpProvider`] — OpenAI-compatible `/chat/completions` client

pub mod http_provider;
pub mod traits;

pub use http_provider::HttpProvider;
pub use traits::{LlmProvider, LlmRequestConfig, ProviderError};
