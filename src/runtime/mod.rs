//! Event loop runtime.

pub mod event_loop;

pub use event_loop::{EventHandler, LoopEvent, RuntimeHandle, TuiRuntime};
