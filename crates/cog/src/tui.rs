use cog_tui::{EventHandler, Frame, InputEvent, Key};

use crate::app::{App, HostOps};
use crate::requests::CompletionEvent;
use crate::session::Focus;
use crate::view;

/// Loop-side adapter: decodes keys into [`App`] calls and renders the view.
pub struct ChatController<H: HostOps> {
    app: App,
    host: H,
}

impl<H: HostOps> ChatController<H> {
    pub fn new(app: App, host: H) -> Self {
        Self { app, host }
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn should_exit(&self) -> bool {
        self.app.should_exit()
    }

    fn on_key(&mut self, key: Key) {
        let host = &mut self.host;
        match key {
            Key::Ctrl('c') | Key::Escape => self.app.on_quit(host),
            Key::Ctrl('n') => self.app.on_new_conversation(host),
            Key::Tab | Key::BackTab => self.app.on_toggle_focus(host),
            Key::Enter => self.app.on_enter(host),
            Key::Backspace => self.app.on_backspace(host),
            Key::Up => self.app.on_move_selection(-1, host),
            Key::Down => self.app.on_move_selection(1, host),
            _ => {}
        }
    }

    fn on_text(&mut self, text: &str) {
        if self.app.session().focus() == Focus::Sidebar {
            for ch in text.chars() {
                match ch {
                    'k' => self.app.on_move_selection(-1, &mut self.host),
                    'j' => self.app.on_move_selection(1, &mut self.host),
                    _ => {}
                }
            }
            return;
        }
        self.app.on_text(text, &mut self.host);
    }
}

impl<H: HostOps> EventHandler<CompletionEvent> for ChatController<H> {
    fn on_input(&mut self, event: InputEvent) {
        self.app.dismiss_notice();
        match event {
            InputEvent::Key(key) => self.on_key(key),
            InputEvent::Text(text) => self.on_text(&text),
            InputEvent::Paste(text) => self.app.on_paste(&text, &mut self.host),
        }
    }

    fn on_event(&mut self, event: CompletionEvent) {
        self.app.on_completion(event, &mut self.host);
    }

    fn render(&mut self, columns: usize, rows: usize) -> Frame {
        view::render(&self.app, columns, rows)
    }
}
