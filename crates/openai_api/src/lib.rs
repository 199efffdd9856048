//! Transport-only client for OpenAI-compatible Chat Completions endpoints.
//!
//! This crate owns request building, header assembly, and response/error
//! parsing. It contains no conversation state and no UI coupling; the
//! `chat_provider_openai` crate adapts it to the provider contract.
//!
//! Requests are single-shot and non-streaming. Failed requests are reported to
//! the caller as-is; nothing here retries.

pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod payload;
pub mod url;

pub use client::OpenAiClient;
pub use config::OpenAiConfig;
pub use error::OpenAiError;
pub use payload::{ChatCompletionRequest, ChatCompletionResponse, WireMessage};
pub use url::normalize_chat_completions_url;
