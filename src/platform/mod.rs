//! Platform terminal implementations.

#[cfg(unix)]
pub mod process_terminal;
