#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chat_provider::{CompletionError, CompletionRequest};
use cog::app::HostOps;
use cog::requests::{CompletionEvent, RequestTag};
use conversation_store::{Conversation, ConversationStore, StoreError};

#[derive(Default)]
pub struct HostSpy {
    pub spawned: Vec<(RequestTag, CompletionRequest)>,
    pub fail_spawn: Option<String>,
    pub render_requests: usize,
    pub stop_requests: usize,
}

impl HostSpy {
    pub fn last_tag(&self) -> RequestTag {
        self.spawned.last().expect("a spawned request").0.clone()
    }

    pub fn reply(&self, text: &str) -> CompletionEvent {
        CompletionEvent {
            tag: self.last_tag(),
            outcome: Ok(text.to_string()),
        }
    }

    pub fn failure(&self, error: CompletionError) -> CompletionEvent {
        CompletionEvent {
            tag: self.last_tag(),
            outcome: Err(error),
        }
    }
}

impl HostOps for HostSpy {
    fn spawn_completion(
        &mut self,
        tag: RequestTag,
        request: CompletionRequest,
    ) -> Result<(), String> {
        if let Some(error) = &self.fail_spawn {
            return Err(error.clone());
        }
        self.spawned.push((tag, request));
        Ok(())
    }

    fn request_render(&mut self) {
        self.render_requests += 1;
    }

    fn request_stop(&mut self) {
        self.stop_requests += 1;
    }
}

#[derive(Default)]
pub struct StoreState {
    pub rows: Vec<Conversation>,
    pub saves: Vec<Conversation>,
    pub deletes: Vec<String>,
    pub fail_saves: bool,
}

/// In-memory store whose state stays observable after the app takes ownership.
#[derive(Clone, Default)]
pub struct SpyStore {
    pub state: Arc<Mutex<StoreState>>,
}

impl SpyStore {
    pub fn with_rows(rows: Vec<Conversation>) -> Self {
        let store = Self::default();
        store.state.lock().expect("store state").rows = rows;
        store
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.state.lock().expect("store state").fail_saves = fail;
    }

    pub fn saves(&self) -> Vec<Conversation> {
        self.state.lock().expect("store state").saves.clone()
    }

    pub fn rows(&self) -> Vec<Conversation> {
        self.state.lock().expect("store state").rows.clone()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.state.lock().expect("store state").deletes.clone()
    }
}

impl ConversationStore for SpyStore {
    fn save(&mut self, conversation: &Conversation) -> Result<(), StoreError> {
        let mut state = self.state.lock().expect("store state");
        if state.fail_saves {
            return Err(StoreError::EmptyConversationId);
        }
        state.saves.push(conversation.clone());
        match state.rows.iter_mut().find(|row| row.id() == conversation.id()) {
            Some(row) => *row = conversation.clone(),
            None => state.rows.push(conversation.clone()),
        }
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Conversation>, StoreError> {
        Ok(self.state.lock().expect("store state").rows.clone())
    }

    fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock().expect("store state");
        state.deletes.push(id.to_string());
        state.rows.retain(|row| row.id() != id);
        Ok(())
    }
}
