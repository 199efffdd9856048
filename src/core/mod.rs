//! Terminal-facing primitives: the terminal trait, input decoding, and text metrics.

pub mod input;
pub mod terminal;
pub mod text;
