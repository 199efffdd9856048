//! Read-only rendering of [`App`] state into a [`Frame`].

use cog_tui::{pad_to_width, truncate_graphemes, truncate_to_width, visible_width, wrap_text, Frame};
use conversation_store::{Conversation, Message, Role};
use time::macros::format_description;
use unicode_segmentation::UnicodeSegmentation;

use crate::app::{App, Notice};
use crate::session::Focus;

pub const SIDEBAR_WIDTH: usize = 30;
pub const SUBTITLE_MAX_CHARS: usize = 50;
pub const INPUT_PROMPT: &str = "┃ ";

const HEADER_TITLE: &str = "Cog";
const EMPTY_SUBTITLE: &str = "New conversation";
const TYPING_INDICATOR: &str = "Assistant is typing...";
const MIN_CHAT_WIDTH: usize = 20;

/// Something the sidebar can list.
pub trait ListEntry {
    fn title(&self) -> &str;

    fn subtitle(&self) -> String;

    fn filter_key(&self) -> &str;
}

impl ListEntry for Conversation {
    fn title(&self) -> &str {
        self.name()
    }

    fn subtitle(&self) -> String {
        match self.last_message() {
            None => EMPTY_SUBTITLE.to_string(),
            Some(message) => {
                let flat = message.content().split_whitespace().collect::<Vec<_>>().join(" ");
                truncate_graphemes(&flat, SUBTITLE_MAX_CHARS, "...")
            }
        }
    }

    fn filter_key(&self) -> &str {
        self.name()
    }
}

fn ansi_wrap(text: &str, prefix: &str, suffix: &str) -> String {
    format!("{prefix}{text}{suffix}")
}

fn dim(text: &str) -> String {
    ansi_wrap(text, "\x1b[2m", "\x1b[22m")
}

fn bold(text: &str) -> String {
    ansi_wrap(text, "\x1b[1m", "\x1b[22m")
}

fn cyan(text: &str) -> String {
    ansi_wrap(text, "\x1b[36m", "\x1b[39m")
}

fn green(text: &str) -> String {
    ansi_wrap(text, "\x1b[32m", "\x1b[39m")
}

fn yellow(text: &str) -> String {
    ansi_wrap(text, "\x1b[33m", "\x1b[39m")
}

fn red(text: &str) -> String {
    ansi_wrap(text, "\x1b[31m", "\x1b[39m")
}

fn reverse(text: &str) -> String {
    ansi_wrap(text, "\x1b[7m", "\x1b[27m")
}

/// Lays out the sidebar and chat pane side by side.
///
/// When the terminal is too narrow for both, only the chat pane is drawn.
pub fn render(app: &App, columns: usize, rows: usize) -> Frame {
    if rows == 0 || columns == 0 {
        return Frame::default();
    }

    let show_sidebar = columns >= SIDEBAR_WIDTH + 1 + MIN_CHAT_WIDTH;
    let chat_width = if show_sidebar {
        columns - SIDEBAR_WIDTH - 1
    } else {
        columns
    };

    let (chat, cursor_col) = chat_lines(app, chat_width, rows);
    let sidebar = if show_sidebar {
        sidebar_lines(app, SIDEBAR_WIDTH, rows)
    } else {
        Vec::new()
    };

    let separator = if app.session().focus() == Focus::Sidebar {
        cyan("│")
    } else {
        dim("│")
    };

    let lines = (0..rows)
        .map(|row| {
            let chat_line = chat.get(row).map(String::as_str).unwrap_or("");
            if show_sidebar {
                let side = sidebar.get(row).map(String::as_str).unwrap_or("");
                format!("{}{separator}{chat_line}", pad_to_width(side, SIDEBAR_WIDTH))
            } else {
                chat_line.to_string()
            }
        })
        .collect();

    let frame = Frame::new(lines);
    match (app.session().focus(), cursor_col) {
        (Focus::ChatInput, Some(col)) => {
            let offset = if show_sidebar { SIDEBAR_WIDTH + 1 } else { 0 };
            frame.with_cursor(rows - 1, offset + col)
        }
        _ => frame,
    }
}

fn sidebar_lines(app: &App, width: usize, rows: usize) -> Vec<String> {
    let session = app.session();
    let focused = session.focus() == Focus::Sidebar;
    let heading = if focused {
        bold(&cyan("Conversations"))
    } else {
        bold("Conversations")
    };
    let mut lines = vec![heading, String::new()];

    let per_entry = 3;
    let visible = (rows.saturating_sub(lines.len()) / per_entry).max(1);
    let first = session.highlighted().saturating_sub(visible - 1);

    for (index, conversation) in session
        .conversations()
        .iter()
        .enumerate()
        .skip(first)
        .take(visible)
    {
        let is_active = session.active_id() == Some(conversation.id());
        let is_highlighted = focused && index == session.highlighted();
        let marker = if is_active { "● " } else { "  " };

        let title = truncate_to_width(
            &format!("{marker}{}", conversation.title()),
            width,
            "…",
        );
        let title = if is_highlighted {
            reverse(&pad_to_width(&title, width))
        } else if is_active {
            bold(&title)
        } else {
            title
        };
        lines.push(title);
        lines.push(dim(&truncate_to_width(
            &format!("  {}", conversation.subtitle()),
            width,
            "…",
        )));
        lines.push(String::new());
    }

    lines
}

/// Returns the chat pane lines and, when the input fits, the cursor column.
fn chat_lines(app: &App, width: usize, rows: usize) -> (Vec<String>, Option<usize>) {
    let session = app.session();
    let name = session
        .active_conversation()
        .map(Conversation::name)
        .unwrap_or(HEADER_TITLE);
    let header = truncate_to_width(&format!(" {HEADER_TITLE} · {name}"), width, "…");

    let mut body = Vec::new();
    match session.active_conversation() {
        Some(conversation) if !conversation.is_empty() => {
            for message in conversation.messages() {
                push_message(&mut body, message, width);
            }
        }
        _ => push_welcome(&mut body, width),
    }
    if app.active_is_awaiting() {
        body.push(yellow(TYPING_INDICATOR));
    }
    match app.notice() {
        Some(Notice::Error(text)) => {
            for line in wrap_text(&format!("Error: {text}"), width) {
                body.push(red(&line));
            }
        }
        Some(Notice::Info(text)) => {
            body.extend(wrap_text(text, width).into_iter().map(|line| yellow(&line)));
        }
        None => {}
    }

    let (input_line, cursor_col) = input_line(app.input(), width);

    let body_rows = rows.saturating_sub(3);
    let skip = body.len().saturating_sub(body_rows);
    let mut lines = Vec::with_capacity(rows);
    if rows >= 3 {
        lines.push(bold(&header));
        lines.push(dim(&"─".repeat(width)));
    }
    lines.extend(body.into_iter().skip(skip));
    lines.resize(rows.saturating_sub(1), String::new());
    lines.push(input_line);

    (lines, cursor_col)
}

fn push_message(body: &mut Vec<String>, message: &Message, width: usize) {
    let stamp = message
        .timestamp()
        .format(format_description!("[hour]:[minute]:[second]"))
        .unwrap_or_default();
    let author = match message.role() {
        Role::User => bold(&green("You")),
        Role::Assistant => bold(&cyan("Assistant")),
    };
    body.push(format!("{author} {}", dim(&format!("[{stamp}]"))));
    body.extend(wrap_text(message.content(), width));
    body.push(String::new());
}

fn push_welcome(body: &mut Vec<String>, width: usize) {
    let welcome = [
        "Welcome to Cog!",
        "Start typing to begin a conversation.",
        "",
        "Controls:",
        "• Tab - Switch between sidebar and chat",
        "• Ctrl+N - New conversation",
        "• Enter - Send message / Select conversation",
        "• Ctrl+C / Esc - Quit",
        "",
    ];
    for line in welcome {
        body.extend(wrap_text(line, width).into_iter().map(|part| dim(&part)));
    }
}

/// Renders the prompt plus the tail of the input that fits.
fn input_line(input: &str, width: usize) -> (String, Option<usize>) {
    let prompt_width = visible_width(INPUT_PROMPT);
    let available = width.saturating_sub(prompt_width + 1);
    let flat = input.replace('\n', " ");

    let mut shown = flat.as_str();
    while visible_width(shown) > available {
        match shown.grapheme_indices(true).nth(1) {
            Some((index, _)) => shown = &shown[index..],
            None => {
                shown = "";
                break;
            }
        }
    }

    let line = format!("{}{shown}", cyan(INPUT_PROMPT));
    let col = prompt_width + visible_width(shown);
    (line, (col < width).then_some(col))
}
