//! Acai core — wire types, conversations, configuration and shared helpers.
//!
//! This crate contains:
//! - **types**: OpenAI chat-completions message, tool and response types
//! - **conversation**: the `Conversation` domain model and its JSONL store
//! - **config**: configuration schema, loader and env overrides
//! - **utils**: path resolution and small string helpers

pub mod config;
pub mod conversation;
pub mod types;
pub mod utils;

pub use conversation::{ChatMessage, Conversation, ConversationStore, Role, StoreError};
