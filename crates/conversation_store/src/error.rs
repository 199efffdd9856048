use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error while {operation} at {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open conversation database at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("SQLite error while {operation}: {source}")]
    Sqlite {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("conversation id must not be empty")]
    EmptyConversationId,

    #[error("conversation '{conversation_id}' has a message with unknown role '{value}'")]
    InvalidRole {
        conversation_id: String,
        value: String,
    },

    #[error("invalid RFC3339 timestamp in field '{field}': {value}")]
    InvalidTimestamp { field: &'static str, value: String },
}

impl StoreError {
    #[must_use]
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn sqlite(operation: &'static str, source: rusqlite::Error) -> Self {
        Self::Sqlite { operation, source }
    }

    #[must_use]
    pub fn timestamp(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidTimestamp {
            field,
            value: value.into(),
        }
    }
}
