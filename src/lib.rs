//! Terminal layer for the `cog` chat client.
//!
//! Invariant: application state is only touched on the thread that owns the
//! [`TuiRuntime`]. Input, resize, and worker results arrive as queued
//! [`LoopEvent`]s and are applied in arrival order.
//!
//! # Public API Overview
//! - [`Terminal`] abstracts the device; [`ProcessTerminal`] drives a real tty.
//! - [`TuiRuntime`] runs the loop and hands out cloneable [`RuntimeHandle`]s.
//! - [`EventHandler`] is implemented by the application.
//! - Text helpers measure and cut strings by display width or grapheme count.

pub mod config;
pub mod logging;

pub mod core;
pub mod platform;
pub mod render;
pub mod runtime;

pub use crate::config::TuiConfig;
pub use crate::core::input::{parse_input_events, InputEvent, Key};
pub use crate::core::terminal::Terminal;
pub use crate::core::text::{
    grapheme_count, pad_to_width, truncate_graphemes, truncate_to_width, visible_width, wrap_text,
};
#[cfg(unix)]
pub use crate::platform::process_terminal::ProcessTerminal;
pub use crate::render::{DiffRenderer, Frame};
pub use crate::runtime::{EventHandler, LoopEvent, RuntimeHandle, TuiRuntime};
