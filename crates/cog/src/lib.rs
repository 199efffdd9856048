//! Multi-conversation terminal chat client.
//!
//! ## Configuration
//!
//! - `OPENAI_API_KEY` is required unless `COG_PROVIDER=mock`.
//! - `COG_MODEL`, `COG_MAX_TOKENS`, `OPENAI_BASE_URL`, `OPENAI_ORGANIZATION`
//!   and `COG_TIMEOUT_SEC` tune the OpenAI provider.
//! - `COG_SYSTEM_INSTRUCTIONS` replaces the built-in system instruction.
//! - `COG_DB_PATH` and `COG_LOG_FILE` move the database and log file, which
//!   otherwise live under `~/.cog/`.
//!
//! ## Control flow
//!
//! [`app::App`] owns the [`session::Session`] and the store and is only touched
//! on the loop thread. Completions run on worker threads and come back as
//! [`requests::CompletionEvent`]s tagged with the conversation that issued them,
//! so a reply always lands in its own conversation even after a switch.

pub mod app;
pub mod commands;
pub mod config;
pub mod providers;
pub mod requests;
pub mod runtime;
pub mod session;
pub mod tui;
pub mod view;
