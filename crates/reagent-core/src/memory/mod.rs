//! Conversation memory: append-only message logs keyed by conversation id

use crate::llm::messages::ChatMessage;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Default number of messages retrieved during prompt assembly
pub const DEFAULT_RETRIEVE_SIZE: usize = 100;

/// Append-only message store keyed by conversation id
///
/// The loop and tool-result appends are the only writers for a given
/// conversation; append order must match think/act interleaving so the
/// model sees a coherent transcript on the next cycle. The interior lock
/// exists only because one handle is shared between those two append
/// sites, not because cycles run concurrently.
pub trait ChatMemory: Send + Sync {
    /// Append a message to a conversation
    fn add(&self, conversation_id: &str, message: ChatMessage);

    /// Retrieve up to the last `n` messages of a conversation, in order
    fn get(&self, conversation_id: &str, last_n: usize) -> Vec<ChatMessage>;

    /// Drop a conversation's log
    fn clear(&self, conversation_id: &str);
}

/// In-process conversation memory
pub struct InMemoryChatMemory {
    conversations: Mutex<HashMap<String, Vec<ChatMessage>>>,
}

impl InMemoryChatMemory {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self {
            conversations: Mutex::new(HashMap::new()),
        }
    }

    /// Number of messages stored for a conversation
    pub fn len(&self, conversation_id: &str) -> usize {
        self.conversations
            .lock()
            .get(conversation_id)
            .map_or(0, Vec::len)
    }

    /// Check if a conversation has no messages
    pub fn is_empty(&self, conversation_id: &str) -> bool {
        self.len(conversation_id) == 0
    }
}

impl Default for InMemoryChatMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatMemory for InMemoryChatMemory {
    fn add(&self, conversation_id: &str, message: ChatMessage) {
        self.conversations
            .lock()
            .entry(conversation_id.to_string())
            .or_default()
            .push(message);
    }

    fn get(&self, conversation_id: &str, last_n: usize) -> Vec<ChatMessage> {
        let conversations = self.conversations.lock();
        match conversations.get(conversation_id) {
            Some(log) => {
                let start = log.len().saturating_sub(last_n);
                log[start..].to_vec()
            }
            None => Vec::new(),
        }
    }

    fn clear(&self, conversation_id: &str) {
        self.conversations.lock().remove(conversation_id);
    }
}
