//! Event dispatcher: routes each input or completion to a [`Session`] mutation
//! plus at most one side effect (persist, issue a request, stop).
//!
//! All methods run on the loop thread. Side effects that leave the thread go
//! through [`HostOps`], which tests replace with a spy.

use chat_provider::CompletionRequest;
use conversation_store::{ConversationStore, Message, StoreError};
use tracing::{debug, info, warn};
use unicode_segmentation::UnicodeSegmentation;

use crate::commands::{parse_slash_command, SlashCommand};
use crate::requests::{
    build_completion_request, CompletionEvent, RequestTag, RequestTracker,
    DEFAULT_SYSTEM_INSTRUCTIONS,
};
use crate::session::{Focus, Session, DEFAULT_CONVERSATION_NAME};

pub const HELP_TEXT: &str = "Tab switch pane | Ctrl+N or /new new chat | /delete delete chat | Enter send/select | Ctrl+C, Esc or /quit exit";

/// One-shot annotation shown on the next render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Self::Info(text) | Self::Error(text) => text,
        }
    }
}

/// Whether a completion is outstanding anywhere in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Idle,
    AwaitingResponse,
}

pub trait HostOps {
    /// Runs `request` off the loop thread and later delivers a
    /// [`CompletionEvent`] carrying `tag`.
    fn spawn_completion(&mut self, tag: RequestTag, request: CompletionRequest)
        -> Result<(), String>;
    fn request_render(&mut self);
    fn request_stop(&mut self);
}

pub struct App {
    session: Session,
    store: Box<dyn ConversationStore>,
    requests: RequestTracker,
    input: String,
    notice: Option<Notice>,
    system_instructions: String,
    should_exit: bool,
}

fn sanitize_system_instructions(raw: Option<String>) -> String {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_SYSTEM_INSTRUCTIONS.to_string())
}

impl App {
    /// Loads every stored conversation. An empty store gets one "New Chat".
    pub fn load(
        store: Box<dyn ConversationStore>,
        system_instructions: Option<String>,
    ) -> Result<Self, StoreError> {
        let conversations = store.load_all()?;
        info!(count = conversations.len(), "loaded conversations");
        Ok(Self::with_session(
            Session::from_conversations(conversations),
            store,
            system_instructions,
        ))
    }

    /// Wraps an existing session. An empty session gets one "New Chat".
    pub fn with_session(
        session: Session,
        store: Box<dyn ConversationStore>,
        system_instructions: Option<String>,
    ) -> Self {
        let mut app = Self {
            session,
            store,
            requests: RequestTracker::new(),
            input: String::new(),
            notice: None,
            system_instructions: sanitize_system_instructions(system_instructions),
            should_exit: false,
        };
        if app.session.is_empty() {
            app.create_default_conversation();
        }
        app
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn system_instructions(&self) -> &str {
        &self.system_instructions
    }

    pub fn should_exit(&self) -> bool {
        self.should_exit
    }

    pub fn activity(&self) -> Activity {
        if self.requests.has_pending() {
            Activity::AwaitingResponse
        } else {
            Activity::Idle
        }
    }

    /// True while the active conversation is waiting for its reply.
    pub fn active_is_awaiting(&self) -> bool {
        self.session
            .active_id()
            .is_some_and(|id| self.requests.is_pending(id))
    }

    /// Clears the one-shot notice once the user has acted after seeing it.
    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn on_text(&mut self, text: &str, host: &mut dyn HostOps) {
        if self.session.focus() != Focus::ChatInput {
            return;
        }
        self.input.push_str(text);
        host.request_render();
    }

    pub fn on_paste(&mut self, text: &str, host: &mut dyn HostOps) {
        self.session.set_focus(Focus::ChatInput);
        self.input.push_str(&clean_pasted_text(text));
        host.request_render();
    }

    pub fn on_backspace(&mut self, host: &mut dyn HostOps) {
        if self.session.focus() != Focus::ChatInput {
            return;
        }
        if let Some((index, _)) = self.input.grapheme_indices(true).next_back() {
            self.input.truncate(index);
            host.request_render();
        }
    }

    pub fn on_toggle_focus(&mut self, host: &mut dyn HostOps) {
        let focus = self.session.toggle_focus();
        debug!(?focus, "focus toggled");
        host.request_render();
    }

    pub fn on_move_selection(&mut self, delta: isize, host: &mut dyn HostOps) {
        if self.session.focus() != Focus::Sidebar {
            return;
        }
        self.session.move_highlight(delta);
        host.request_render();
    }

    /// Enter: selects in the sidebar, submits in the chat input.
    pub fn on_enter(&mut self, host: &mut dyn HostOps) {
        match self.session.focus() {
            Focus::Sidebar => self.on_select(host),
            Focus::ChatInput => self.on_submit(host),
        }
    }

    /// Activates the highlighted sidebar entry. Selection is never persisted.
    pub fn on_select(&mut self, host: &mut dyn HostOps) {
        if self.session.focus() != Focus::Sidebar {
            return;
        }
        if let Some(id) = self.session.highlighted_id().map(str::to_string) {
            self.session.select_conversation(&id);
            self.session.set_focus(Focus::ChatInput);
        }
        host.request_render();
    }

    pub fn on_new_conversation(&mut self, host: &mut dyn HostOps) {
        let id = self.session.create_conversation(DEFAULT_CONVERSATION_NAME);
        self.session.select_conversation(&id);
        self.session.set_focus(Focus::ChatInput);
        self.persist(&id);
        info!(conversation_id = %id, "created conversation");
        host.request_render();
    }

    pub fn on_submit(&mut self, host: &mut dyn HostOps) {
        if self.session.focus() != Focus::ChatInput {
            return;
        }
        let content = self.input.trim().to_string();
        if content.is_empty() {
            return;
        }

        if let Some(command) = parse_slash_command(&content) {
            self.input.clear();
            self.handle_slash_command(command, host);
            return;
        }

        if self.activity() == Activity::AwaitingResponse {
            debug!("ignoring submit while a response is pending");
            return;
        }
        let Some(id) = self.session.active_id().map(str::to_string) else {
            return;
        };
        let Some(tag) = self.requests.begin(&id) else {
            return;
        };

        self.input.clear();
        self.session.append_message(&id, Message::user(content));
        self.persist(&id);

        let Some(conversation) = self.session.conversation(&id) else {
            self.requests.settle(&tag);
            return;
        };
        let request = build_completion_request(&self.system_instructions, conversation);
        debug!(conversation_id = %id, messages = request.messages.len(), "dispatching completion");
        if let Err(error) = host.spawn_completion(tag.clone(), request) {
            warn!(%error, "failed to dispatch completion");
            self.requests.settle(&tag);
            self.notice = Some(Notice::Error(error));
        }
        host.request_render();
    }

    fn handle_slash_command(&mut self, command: SlashCommand, host: &mut dyn HostOps) {
        match command {
            SlashCommand::New => self.on_new_conversation(host),
            SlashCommand::Delete => self.on_delete(host),
            SlashCommand::Help => {
                self.notice = Some(Notice::Info(HELP_TEXT.to_string()));
                host.request_render();
            }
            SlashCommand::Quit => self.on_quit(host),
            SlashCommand::Unknown(command) => {
                self.notice = Some(Notice::Error(format!(
                    "Unknown command: {command}. Try /help"
                )));
                host.request_render();
            }
        }
    }

    /// Deletes the active conversation from memory and the store.
    pub fn on_delete(&mut self, host: &mut dyn HostOps) {
        let Some(id) = self.session.active_id().map(str::to_string) else {
            return;
        };
        if let Err(error) = self.store.delete(&id) {
            warn!(conversation_id = %id, %error, "failed to delete conversation");
            self.notice = Some(Notice::Error(format!(
                "failed to delete conversation: {error}"
            )));
            host.request_render();
            return;
        }
        self.session.remove_conversation(&id);
        info!(conversation_id = %id, "deleted conversation");
        if self.session.is_empty() {
            self.create_default_conversation();
        }
        host.request_render();
    }

    /// Applies a completion to the conversation named by its tag, active or not.
    pub fn on_completion(&mut self, event: CompletionEvent, host: &mut dyn HostOps) {
        let CompletionEvent { tag, outcome } = event;
        if !self.requests.settle(&tag) {
            debug!(
                conversation_id = tag.conversation_id(),
                sequence = tag.sequence(),
                "discarding completion for a request that is not outstanding"
            );
            return;
        }

        match outcome {
            Ok(text) => {
                let id = tag.conversation_id();
                if self.session.append_message(id, Message::assistant(text)) {
                    self.persist(id);
                }
            }
            Err(error) => {
                warn!(conversation_id = tag.conversation_id(), %error, "completion failed");
                self.notice = Some(Notice::Error(error.to_string()));
            }
        }
        host.request_render();
    }

    /// Terminal transition. Outstanding requests are abandoned.
    pub fn on_quit(&mut self, host: &mut dyn HostOps) {
        let abandoned = self.requests.abandon_all();
        if abandoned > 0 {
            info!(abandoned, "abandoning pending completions on quit");
        }
        self.should_exit = true;
        host.request_stop();
    }

    fn create_default_conversation(&mut self) {
        let id = self.session.create_conversation(DEFAULT_CONVERSATION_NAME);
        self.session.select_conversation(&id);
        self.persist(&id);
    }

    fn persist(&mut self, id: &str) {
        let Some(conversation) = self.session.conversation(id) else {
            return;
        };
        if let Err(error) = self.store.save(conversation) {
            warn!(conversation_id = %id, %error, "failed to save conversation");
            self.notice = Some(Notice::Error(format!(
                "failed to save conversation: {error}"
            )));
        }
    }
}

/// Terminal line endings become `\n`, tabs expand, other control characters are dropped.
fn clean_pasted_text(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\t', "    ")
        .chars()
        .filter(|ch| *ch == '\n' || !ch.is_control())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use conversation_store::SqliteConversationStore;

    #[derive(Default)]
    struct NullHost;

    impl HostOps for NullHost {
        fn spawn_completion(
            &mut self,
            _tag: RequestTag,
            _request: CompletionRequest,
        ) -> Result<(), String> {
            Ok(())
        }

        fn request_render(&mut self) {}

        fn request_stop(&mut self) {}
    }

    fn app() -> App {
        let store = SqliteConversationStore::open_in_memory().expect("store");
        App::load(Box::new(store), None).expect("app")
    }

    #[test]
    fn blank_system_instructions_fall_back_to_default() {
        assert_eq!(
            sanitize_system_instructions(Some("   ".to_string())),
            DEFAULT_SYSTEM_INSTRUCTIONS
        );
        assert_eq!(sanitize_system_instructions(Some(" terse ".to_string())), "terse");
    }

    #[test]
    fn backspace_removes_one_grapheme() {
        let mut app = app();
        let mut host = NullHost;
        app.on_text("hé👍🏽", &mut host);
        app.on_backspace(&mut host);
        assert_eq!(app.input(), "hé");
    }

    #[test]
    fn typing_is_ignored_while_the_sidebar_has_focus() {
        let mut app = app();
        let mut host = NullHost;
        app.on_toggle_focus(&mut host);
        app.on_text("j", &mut host);
        assert_eq!(app.input(), "");
    }

    #[test]
    fn paste_moves_focus_to_the_input() {
        let mut app = app();
        let mut host = NullHost;
        app.on_toggle_focus(&mut host);
        app.on_paste("line one\nline two", &mut host);
        assert_eq!(app.session().focus(), Focus::ChatInput);
        assert_eq!(app.input(), "line one\nline two");
    }
}
