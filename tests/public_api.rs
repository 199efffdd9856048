#![allow(unused_imports)]

use cog_tui::config::{ALT_SCREEN_ENV, WRITE_LOG_ENV};
use cog_tui::logging::{init_file_logging, DEFAULT_LOG_FILTER, LOG_FILTER_ENV};
use cog_tui::render::CursorPos;
use cog_tui::{
    grapheme_count, pad_to_width, parse_input_events, truncate_graphemes, truncate_to_width,
    visible_width, wrap_text, DiffRenderer, EventHandler, Frame, InputEvent, Key, LoopEvent,
    RuntimeHandle, Terminal, TuiConfig, TuiRuntime,
};

#[cfg(unix)]
use cog_tui::ProcessTerminal;

#[test]
fn public_api_exports_compile() {}
