//! Conversations — the persisted, ordered message history of one chat.
//!
//! # Disk format (JSONL)
//!
//! Each conversation is a `.jsonl` file under `~/.acai/conversations/`.
//! - Line 1: metadata `{"_type": "metadata", "id": "...", "title": "...", "created_at": "...", "updated_at": "..."}`
//! - Lines 2+: messages `{"role": "user", "content": "hello", "created_at": "..."}`

pub mod model;
pub mod store;

pub use model::{ChatMessage, Conversation, Role};
pub use store::{ConversationStore, ConversationSummary, StoreError};
