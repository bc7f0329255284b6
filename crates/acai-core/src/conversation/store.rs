//! Conversation persistence and caching.
//!
//! File format: JSONL in `~/.acai/conversations/{id}.jsonl`
//! - Line 1: `{"_type":"metadata","id":"...","title":"...","created_at":"...","updated_at":"..."}`
//! - Line 2+: `{"role":"user","content":"hello","created_at":"..."}`

use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::model::{ChatMessage, Conversation};
use crate::utils;

/// Errors raised by the conversation store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("conversation not found: {0}")]
    NotFound(String),
    #[error("conversation storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("conversation record is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

// ─────────────────────────────────────────────
// Metadata (first line of JSONL)
// ─────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct ConversationMetadata {
    #[serde(rename = "_type")]
    record_type: String,
    id: String,
    #[serde(default)]
    title: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Summary of a conversation for listing purposes.
#[derive(Clone, Debug)]
pub struct ConversationSummary {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ─────────────────────────────────────────────
// ConversationStore
// ─────────────────────────────────────────────

/// Persists conversations as JSONL files with an in-memory cache.
///
/// Thread-safe via `RwLock`; writers hold the lock across the read-modify-save
/// cycle so concurrent appends to the same conversation are never lost.
pub struct ConversationStore {
    dir: PathBuf,
    cache: RwLock<HashMap<String, Conversation>>,
}

impl ConversationStore {
    /// Open (and create if needed) a store rooted at `dir`.
    ///
    /// `dir` defaults to `~/.acai/conversations/` if `None`.
    pub fn new(dir: Option<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.unwrap_or_else(utils::get_conversations_path);
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// Create a new conversation seeded with its first message.
    pub fn create(&self, first_message: ChatMessage) -> Result<Conversation, StoreError> {
        let conversation = Conversation::new().with_message(first_message);
        self.save_to_disk(&conversation)?;
        self.write_cache()
            .insert(conversation.id.clone(), conversation.clone());
        debug!(conversation_id = %conversation.id, "created conversation");
        Ok(conversation)
    }

    /// Load a conversation by id.
    pub fn load(&self, id: &str) -> Result<Conversation, StoreError> {
        if let Some(conversation) = self.read_cache().get(id) {
            return Ok(conversation.clone());
        }

        let conversation = self
            .load_from_disk(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        self.write_cache()
            .insert(id.to_string(), conversation.clone());
        Ok(conversation)
    }

    /// Append a message to an existing conversation and persist it.
    pub fn append(&self, id: &str, message: ChatMessage) -> Result<Conversation, StoreError> {
        self.update(id, |conversation| conversation.push(message))
    }

    /// Replace the conversation's title.
    pub fn set_title(&self, id: &str, title: &str) -> Result<Conversation, StoreError> {
        self.update(id, |conversation| {
            conversation.title = title.to_string();
            conversation.updated_at = Utc::now();
        })
    }

    /// List all conversations on disk, newest first.
    pub fn list(&self) -> Vec<ConversationSummary> {
        let mut summaries = Vec::new();

        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to read conversations directory: {}", e);
                return summaries;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != "jsonl") {
                continue;
            }

            let Ok(file) = std::fs::File::open(&path) else {
                continue;
            };
            let reader = std::io::BufReader::new(file);
            if let Some(Ok(line)) = reader.lines().next() {
                if let Ok(meta) = serde_json::from_str::<ConversationMetadata>(&line) {
                    summaries.push(ConversationSummary {
                        id: meta.id,
                        title: meta.title,
                        created_at: meta.created_at,
                        updated_at: meta.updated_at,
                    });
                }
            }
        }

        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        summaries
    }

    fn update<F>(&self, id: &str, mutate: F) -> Result<Conversation, StoreError>
    where
        F: FnOnce(&mut Conversation),
    {
        let mut cache = self.write_cache();
        let mut conversation = match cache.get(id) {
            Some(c) => c.clone(),
            None => self
                .load_from_disk(id)?
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?,
        };

        mutate(&mut conversation);
        self.save_to_disk(&conversation)?;
        cache.insert(id.to_string(), conversation.clone());
        Ok(conversation)
    }

    fn read_cache(&self) -> RwLockReadGuard<'_, HashMap<String, Conversation>> {
        self.cache.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, HashMap<String, Conversation>> {
        self.cache.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn conversation_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.jsonl", utils::safe_filename(id)))
    }

    fn load_from_disk(&self, id: &str) -> Result<Option<Conversation>, StoreError> {
        let path = self.conversation_path(id);
        if !path.exists() {
            return Ok(None);
        }

        let reader = std::io::BufReader::new(std::fs::File::open(&path)?);
        let mut lines = reader.lines();

        let meta: ConversationMetadata = match lines.next() {
            Some(line) => serde_json::from_str(&line?)?,
            None => return Ok(None),
        };
        // Distinct ids can share a sanitized filename.
        if meta.id != id {
            debug!(requested = %id, stored = %meta.id, "conversation file belongs to another id");
            return Ok(None);
        }

        let mut conversation = Conversation {
            id: meta.id,
            title: meta.title,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
            messages: Vec::new(),
        };

        for line in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ChatMessage>(&line) {
                Ok(msg) => conversation.messages.push(msg),
                Err(e) => warn!(conversation_id = %id, error = %e, "skipping malformed message line"),
            }
        }

        debug!(
            conversation_id = %id,
            messages = conversation.messages.len(),
            "loaded conversation from disk"
        );
        Ok(Some(conversation))
    }

    /// Rewrite the whole file (metadata + messages).
    fn save_to_disk(&self, conversation: &Conversation) -> Result<(), StoreError> {
        let path = self.conversation_path(&conversation.id);
        let mut file = std::fs::File::create(&path)?;

        let meta = ConversationMetadata {
            record_type: "metadata".to_string(),
            id: conversation.id.clone(),
            title: conversation.title.clone(),
            created_at: conversation.created_at,
            updated_at: conversation.updated_at,
        };
        writeln!(file, "{}", serde_json::to_string(&meta)?)?;

        for msg in &conversation.messages {
            writeln!(file, "{}", serde_json::to_string(msg)?)?;
        }

        debug!(
            conversation_id = %conversation.id,
            messages = conversation.messages.len(),
            path = %path.display(),
            "saved conversation"
        );
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
