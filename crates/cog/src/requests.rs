//! Request lifecycle: tagging completions with the conversation that issued them.

use std::collections::HashMap;

use chat_provider::{ChatMessage, ChatRole, CompletionError, CompletionRequest};
use conversation_store::{Conversation, Role};
use tracing::debug;

pub const DEFAULT_SYSTEM_INSTRUCTIONS: &str =
    "You are a helpful AI assistant. Provide clear, concise, and helpful responses.";

/// Binds an in-flight completion to the conversation id it was issued for.
///
/// The sequence number distinguishes a request from an earlier one for the
/// same conversation, so a late result cannot settle the wrong request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestTag {
    conversation_id: String,
    sequence: u64,
}

impl RequestTag {
    #[must_use]
    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

/// Result of one completion, delivered back to the loop thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionEvent {
    pub tag: RequestTag,
    pub outcome: Result<String, CompletionError>,
}

/// Tracks at most one outstanding request per conversation.
#[derive(Debug, Default)]
pub struct RequestTracker {
    pending: HashMap<String, u64>,
    next_sequence: u64,
}

impl RequestTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a tag for `conversation_id`, or `None` when one is already pending.
    pub fn begin(&mut self, conversation_id: &str) -> Option<RequestTag> {
        if self.pending.contains_key(conversation_id) {
            debug!(conversation_id, "rejecting duplicate request");
            return None;
        }
        self.next_sequence += 1;
        self.pending
            .insert(conversation_id.to_string(), self.next_sequence);
        Some(RequestTag {
            conversation_id: conversation_id.to_string(),
            sequence: self.next_sequence,
        })
    }

    /// Consumes `tag`. Returns `false` for a tag that is not outstanding.
    pub fn settle(&mut self, tag: &RequestTag) -> bool {
        match self.pending.get(&tag.conversation_id) {
            Some(sequence) if *sequence == tag.sequence => {
                self.pending.remove(&tag.conversation_id);
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    #[must_use]
    pub fn is_pending(&self, conversation_id: &str) -> bool {
        self.pending.contains_key(conversation_id)
    }

    /// Forgets every outstanding request. Returns how many were dropped.
    pub fn abandon_all(&mut self) -> usize {
        let abandoned = self.pending.len();
        self.pending.clear();
        abandoned
    }
}

/// Builds the provider history: the system instruction, then every message.
#[must_use]
pub fn build_completion_request(
    system_instructions: &str,
    conversation: &Conversation,
) -> CompletionRequest {
    let mut messages = Vec::with_capacity(conversation.messages().len() + 1);
    messages.push(ChatMessage::system(system_instructions));
    messages.extend(conversation.messages().iter().map(|message| {
        let role = match message.role() {
            Role::User => ChatRole::User,
            Role::Assistant => ChatRole::Assistant,
        };
        ChatMessage::new(role, message.content())
    }));
    CompletionRequest::new(messages)
}
