//! Rendering pipeline.

pub mod frame;
pub mod renderer;

pub use frame::{CursorPos, Frame};
pub use renderer::DiffRenderer;
