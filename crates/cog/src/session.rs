//! Canonical in-memory registry of conversations.
//!
//! Every mutation of the conversation list, the active pointer, and focus goes
//! through [`Session`]. Unknown ids are tolerated everywhere because a
//! completion can race with a deletion.

use cog_tui::truncate_graphemes;
use conversation_store::{Conversation, Message};
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_CONVERSATION_NAME: &str = "New Chat";
pub const TITLE_MAX_CHARS: usize = 30;
pub const TITLE_ELLIPSIS: &str = "...";

const MAX_ID_ATTEMPTS: usize = 16;

/// Which pane receives keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    Sidebar,
    #[default]
    ChatInput,
}

impl Focus {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Sidebar => Self::ChatInput,
            Self::ChatInput => Self::Sidebar,
        }
    }
}

type IdGenerator = Box<dyn FnMut() -> String + Send>;

pub struct Session {
    conversations: Vec<Conversation>,
    active_id: Option<String>,
    focus: Focus,
    highlighted: usize,
    id_generator: IdGenerator,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("conversations", &self.conversations.len())
            .field("active_id", &self.active_id)
            .field("focus", &self.focus)
            .field("highlighted", &self.highlighted)
            .finish()
    }
}

/// Generates `conv_<32 hex digits>` ids.
#[must_use]
pub fn random_conversation_id() -> String {
    format!("conv_{}", Uuid::new_v4().simple())
}

/// Derives a display title from message content.
///
/// Whitespace runs collapse to one space and the result is cut to
/// [`TITLE_MAX_CHARS`] grapheme clusters, ellipsis included.
#[must_use]
pub fn derive_title(content: &str) -> String {
    let collapsed = content.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_graphemes(&collapsed, TITLE_MAX_CHARS, TITLE_ELLIPSIS)
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::from_conversations(Vec::new())
    }

    /// Wraps conversations loaded from the store. The first one becomes active.
    #[must_use]
    pub fn from_conversations(conversations: Vec<Conversation>) -> Self {
        let active_id = conversations.first().map(|c| c.id().to_string());
        Self {
            conversations,
            active_id,
            focus: Focus::default(),
            highlighted: 0,
            id_generator: Box::new(random_conversation_id),
        }
    }

    #[must_use]
    pub fn with_id_generator(mut self, generator: impl FnMut() -> String + Send + 'static) -> Self {
        self.id_generator = Box::new(generator);
        self
    }

    /// Creates an empty conversation and returns its id.
    ///
    /// The new id never collides with a held one. The conversation becomes
    /// active only when nothing else is.
    pub fn create_conversation(&mut self, title: &str) -> String {
        let id = self.unused_id();
        self.conversations
            .push(Conversation::new(id.clone(), title, OffsetDateTime::now_utc()));
        if self.active_id.is_none() {
            self.set_active(&id);
        }
        id
    }

    fn unused_id(&mut self) -> String {
        let mut base = String::new();
        for _ in 0..MAX_ID_ATTEMPTS {
            base = (self.id_generator)();
            if !self.contains(&base) {
                return base;
            }
            debug!(id = %base, "conversation id collision, regenerating");
        }

        let mut suffix = 1usize;
        loop {
            let candidate = format!("{base}_{suffix}");
            if !self.contains(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }

    /// Makes `id` active. Returns `false` and changes nothing when it is unknown.
    pub fn select_conversation(&mut self, id: &str) -> bool {
        if !self.contains(id) {
            debug!(id, "ignoring selection of unknown conversation");
            return false;
        }
        self.set_active(id);
        true
    }

    fn set_active(&mut self, id: &str) {
        self.active_id = Some(id.to_string());
        if let Some(index) = self.position(id) {
            self.highlighted = index;
        }
    }

    /// Appends `message` to conversation `id`; a no-op for unknown ids.
    ///
    /// The first message of a conversation names it. Later messages never do.
    pub fn append_message(&mut self, id: &str, message: Message) -> bool {
        let Some(conversation) = self.conversations.iter_mut().find(|c| c.id() == id) else {
            debug!(id, "dropping message for unknown conversation");
            return false;
        };

        if conversation.is_empty() {
            conversation.set_name(derive_title(message.content()));
        }
        conversation.push_message(message);
        true
    }

    /// Removes conversation `id`, moving the active pointer to a neighbour.
    pub fn remove_conversation(&mut self, id: &str) -> Option<Conversation> {
        let index = self.position(id)?;
        let removed = self.conversations.remove(index);

        if self.active_id.as_deref() == Some(id) {
            let next = index.min(self.conversations.len().saturating_sub(1));
            self.active_id = self.conversations.get(next).map(|c| c.id().to_string());
        }
        let active_index = self
            .active_id
            .as_deref()
            .and_then(|active| self.position(active));
        self.highlighted = active_index.unwrap_or(0);
        Some(removed)
    }

    #[must_use]
    pub fn active_conversation(&self) -> Option<&Conversation> {
        self.active_id.as_deref().and_then(|id| self.conversation(id))
    }

    #[must_use]
    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    #[must_use]
    pub fn conversation(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id() == id)
    }

    #[must_use]
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.conversations.iter().position(|c| c.id() == id)
    }

    #[must_use]
    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
    }

    pub fn toggle_focus(&mut self) -> Focus {
        self.focus = self.focus.toggled();
        if self.focus == Focus::Sidebar {
            if let Some(index) = self.active_id.clone().and_then(|id| self.position(&id)) {
                self.highlighted = index;
            }
        }
        self.focus
    }

    /// Index of the sidebar highlight.
    #[must_use]
    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    #[must_use]
    pub fn highlighted_id(&self) -> Option<&str> {
        self.conversations.get(self.highlighted).map(|c| c.id())
    }

    /// Moves the sidebar highlight by `delta`, clamped to the list.
    pub fn move_highlight(&mut self, delta: isize) {
        let Some(last) = self.conversations.len().checked_sub(1) else {
            self.highlighted = 0;
            return;
        };
        self.highlighted = self.highlighted.saturating_add_signed(delta).min(last);
    }
}
