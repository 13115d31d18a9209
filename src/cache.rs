use dashmap::DashMap;
use log::warn;
use std::collections::HashSet;

use crate::types::conversation::ConversationId;
use crate::types::message::Message;

/// Outcome of a cache insert.
#[derive(Clone, Debug)]
pub struct Insertion {
    pub conversation: ConversationId,
    /// False when the message id was already present (duplicate delivery).
    pub inserted: bool,
}

#[derive(Default)]
struct Entry {
    /// Messages in insertion order; `snapshot` sorts a copy for display.
    messages: Vec<Message>,
    seen_ids: HashSet<String>,
}

/// Per-conversation ordered, deduplicated message store.
///
/// Single source of truth for "what has this client seen for conversation X".
/// History fetches and live frames overlap, so insertion is an idempotent
/// merge keyed by the server-assigned message id.
pub struct ConversationCache {
    local_user_id: String,
    entries: DashMap<ConversationId, Entry>,
}

impl ConversationCache {
    pub fn new(local_user_id: impl Into<String>) -> Self {
        Self {
            local_user_id: local_user_id.into(),
            entries: DashMap::new(),
        }
    }

    /// Inserts one message into the conversation derived from its fields.
    ///
    /// Returns `None` when the message binds to no conversation (it is
    /// dropped), otherwise the target conversation and whether the message
    /// was net-new.
    pub fn insert(&self, message: Message) -> Option<Insertion> {
        let Some(conversation) = message.conversation_for(&self.local_user_id) else {
            warn!(
                target: "Client/Cache",
                "Message {} binds to no conversation, dropping", message.id
            );
            return None;
        };

        let mut entry = self.entries.entry(conversation.clone()).or_default();
        let inserted = entry.seen_ids.insert(message.id.clone());
        if inserted {
            entry.messages.push(message);
        }

        Some(Insertion {
            conversation,
            inserted,
        })
    }

    /// Applies `insert` per item and returns the number of net-new messages,
    /// so the caller can decide whether a re-render is warranted.
    pub fn merge(&self, messages: Vec<Message>) -> usize {
        let mut added = 0;
        for message in messages {
            if matches!(
                self.insert(message),
                Some(Insertion { inserted: true, .. })
            ) {
                added += 1;
            }
        }
        added
    }

    /// Messages of one conversation, ascending by timestamp. The sort is
    /// stable: equal timestamps keep insertion order.
    pub fn snapshot(&self, conversation: &ConversationId) -> Vec<Message> {
        let Some(entry) = self.entries.get(conversation) else {
            return Vec::new();
        };
        let mut messages = entry.messages.clone();
        messages.sort_by_key(|m| m.timestamp);
        messages
    }

    pub fn len(&self, conversation: &ConversationId) -> usize {
        self.entries
            .get(conversation)
            .map(|e| e.messages.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self, conversation: &ConversationId) -> bool {
        self.len(conversation) == 0
    }
}
