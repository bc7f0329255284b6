//! Acai Agent — reply loop, title generator, tools, and chat service.
//!
//! This crate contains:
//! - **tools**: Tool trait, registry, and built-in tools (weather, time, holidays)
//! - **sources**: HTTP clients behind the weather and holiday tools
//! - **reply_loop**: The bounded model ↔ tool round-trip loop
//! - **title**: One-shot conversation titling
//! - **service**: Conversation lifecycle over the store and assistant

pub mod assistant;
pub mod cancel;
pub mod context;
pub mod error;
pub mod reply_loop;
pub mod service;
pub mod sources;
pub mod title;
pub mod tools;

pub use assistant::{Assistant, LlmAssistant};
pub use cancel::{CallContext, Interrupted};
pub use context::ContextBuilder;
pub use error::AssistantError;
pub use reply_loop::{ReplyLoop, MAX_TOOL_ROUNDS};
pub use service::{ChatService, ServiceError, StartedConversation};
pub use title::{normalize_title, TitleGenerator};
pub use tools::{build_registry, Tool, ToolError, ToolRegistry};
