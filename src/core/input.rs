//! Decoding of raw terminal input into keys, text, and bracketed pastes.

const PASTE_START: &str = "\x1b[200~";
const PASTE_END: &str = "\x1b[201~";

/// A decoded non-text key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    Tab,
    BackTab,
    Backspace,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Delete,
    /// Control chord with a lowercase ASCII letter, e.g. `Ctrl('c')`.
    Ctrl(char),
    /// Alt (meta) chord, sent as ESC followed by the character.
    Alt(char),
}

/// Input event delivered to the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(Key),
    /// A run of printable characters typed in one chunk.
    Text(String),
    /// Bracketed paste contents, verbatim.
    Paste(String),
}

/// Splits one chunk read from the terminal into input events.
///
/// Unknown escape sequences are dropped. A trailing lone ESC is reported as
/// [`Key::Escape`].
pub fn parse_input_events(data: &str) -> Vec<InputEvent> {
    let mut events = Vec::new();
    let mut remaining = data;

    while !remaining.is_empty() {
        let Some(start) = remaining.find(PASTE_START) else {
            parse_keys_and_text(remaining, &mut events);
            break;
        };

        parse_keys_and_text(&remaining[..start], &mut events);
        let after_start = &remaining[start + PASTE_START.len()..];
        match after_start.find(PASTE_END) {
            Some(end) => {
                events.push(InputEvent::Paste(after_start[..end].to_string()));
                remaining = &after_start[end + PASTE_END.len()..];
            }
            None => {
                events.push(InputEvent::Paste(after_start.to_string()));
                break;
            }
        }
    }

    events
}

fn parse_keys_and_text(data: &str, events: &mut Vec<InputEvent>) {
    let mut text = String::new();
    let mut chars = data.char_indices().peekable();

    while let Some((index, ch)) = chars.next() {
        let key = match ch {
            '\x1b' => {
                let rest = &data[index + 1..];
                match parse_escape(rest) {
                    Some((key, consumed)) => {
                        // Skip the characters that belong to the escape sequence.
                        let target = index + 1 + consumed;
                        while chars.peek().is_some_and(|(next, _)| *next < target) {
                            chars.next();
                        }
                        key
                    }
                    None => None,
                }
            }
            '\r' | '\n' => Some(Key::Enter),
            '\t' => Some(Key::Tab),
            '\x7f' | '\x08' => Some(Key::Backspace),
            '\x01'..='\x1a' => Some(Key::Ctrl(char::from(b'a' + (ch as u8 - 1)))),
            ch if ch.is_control() => None,
            ch => {
                text.push(ch);
                continue;
            }
        };

        if !text.is_empty() {
            events.push(InputEvent::Text(std::mem::take(&mut text)));
        }
        if let Some(key) = key {
            events.push(InputEvent::Key(key));
        }
    }

    if !text.is_empty() {
        events.push(InputEvent::Text(text));
    }
}

/// Parses the bytes following an ESC. Returns the key (if recognized) and the
/// number of bytes consumed after the ESC.
fn parse_escape(rest: &str) -> Option<(Option<Key>, usize)> {
    let mut chars = rest.chars();
    match chars.next() {
        None => Some((Some(Key::Escape), 0)),
        Some('\x1b') => Some((Some(Key::Escape), 0)),
        Some('[') => {
            let body = &rest[1..];
            let end = body.find(|ch: char| ('\x40'..='\x7e').contains(&ch))?;
            let params = &body[..end];
            let final_char = body[end..].chars().next()?;
            Some((csi_key(params, final_char), 1 + end + final_char.len_utf8()))
        }
        Some('O') => {
            let final_char = chars.next()?;
            let key = match final_char {
                'A' => Some(Key::Up),
                'B' => Some(Key::Down),
                'C' => Some(Key::Right),
                'D' => Some(Key::Left),
                'H' => Some(Key::Home),
                'F' => Some(Key::End),
                _ => None,
            };
            Some((key, 1 + final_char.len_utf8()))
        }
        Some(ch) if !ch.is_control() => Some((Some(Key::Alt(ch)), ch.len_utf8())),
        Some(_) => Some((Some(Key::Escape), 0)),
    }
}

fn csi_key(params: &str, final_char: char) -> Option<Key> {
    match (params, final_char) {
        (_, 'A') => Some(Key::Up),
        (_, 'B') => Some(Key::Down),
        (_, 'C') => Some(Key::Right),
        (_, 'D') => Some(Key::Left),
        (_, 'H') => Some(Key::Home),
        (_, 'F') => Some(Key::End),
        ("", 'Z') => Some(Key::BackTab),
        ("1" | "7", '~') => Some(Key::Home),
        ("4" | "8", '~') => Some(Key::End),
        ("3", '~') => Some(Key::Delete),
        ("5", '~') => Some(Key::PageUp),
        ("6", '~') => Some(Key::PageDown),
        _ => None,
    }
}
