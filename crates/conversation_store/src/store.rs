use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::model::{format_timestamp, parse_timestamp, Conversation, Message, Role};
use crate::schema::{
    DELETE_CONVERSATION, DELETE_MESSAGES, INSERT_MESSAGE, PRAGMAS, SCHEMA, SELECT_CONVERSATIONS,
    SELECT_MESSAGES, UPSERT_CONVERSATION,
};

/// Durable home for conversations.
///
/// `save` is all-or-nothing and idempotent. `load_all` returns conversations by
/// creation time with messages in send order. `delete` of an unknown id is a no-op.
pub trait ConversationStore: Send {
    fn save(&mut self, conversation: &Conversation) -> Result<(), StoreError>;

    fn load_all(&self) -> Result<Vec<Conversation>, StoreError>;

    fn delete(&mut self, id: &str) -> Result<(), StoreError>;
}

/// SQLite-backed [`ConversationStore`].
#[derive(Debug)]
pub struct SqliteConversationStore {
    connection: Connection,
    path: Option<PathBuf>,
}

struct ConversationRow {
    id: Option<String>,
    name: String,
    created_at: String,
    updated_at: String,
}

impl SqliteConversationStore {
    /// Opens (creating if needed) the database at `path` and applies the schema.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|source| StoreError::io("creating data directory", parent, source))?;
        }

        let connection = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::initialize(connection, Some(path.to_path_buf()))
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let connection = Connection::open_in_memory().map_err(|source| StoreError::Open {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        Self::initialize(connection, None)
    }

    fn initialize(connection: Connection, path: Option<PathBuf>) -> Result<Self, StoreError> {
        connection
            .execute_batch(PRAGMAS)
            .map_err(|source| StoreError::sqlite("enabling foreign keys", source))?;
        connection
            .execute_batch(SCHEMA)
            .map_err(|source| StoreError::sqlite("creating schema", source))?;
        debug!(path = ?path, "conversation store ready");
        Ok(Self { connection, path })
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn load_messages(&self, conversation_id: &str) -> Result<Vec<Message>, StoreError> {
        let mut statement = self
            .connection
            .prepare_cached(SELECT_MESSAGES)
            .map_err(|source| StoreError::sqlite("preparing message query", source))?;
        let rows = statement
            .query_map(params![conversation_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(|source| StoreError::sqlite("loading messages", source))?;

        let mut messages = Vec::new();
        for row in rows {
            let (role, content, created_at) =
                row.map_err(|source| StoreError::sqlite("reading message row", source))?;
            let role = Role::parse(&role).ok_or_else(|| StoreError::InvalidRole {
                conversation_id: conversation_id.to_string(),
                value: role.clone(),
            })?;
            let timestamp = parse_timestamp("messages.created_at", &created_at)?;
            messages.push(Message::new(role, content, timestamp));
        }
        Ok(messages)
    }
}

impl ConversationStore for SqliteConversationStore {
    fn save(&mut self, conversation: &Conversation) -> Result<(), StoreError> {
        if conversation.id().trim().is_empty() {
            return Err(StoreError::EmptyConversationId);
        }

        let transaction = self
            .connection
            .transaction()
            .map_err(|source| StoreError::sqlite("starting save", source))?;

        transaction
            .execute(
                UPSERT_CONVERSATION,
                params![
                    conversation.id(),
                    conversation.name(),
                    format_timestamp(conversation.created_at()),
                    format_timestamp(conversation.updated_at()),
                ],
            )
            .map_err(|source| StoreError::sqlite("upserting conversation", source))?;

        transaction
            .execute(DELETE_MESSAGES, params![conversation.id()])
            .map_err(|source| StoreError::sqlite("clearing messages", source))?;

        {
            let mut insert = transaction
                .prepare_cached(INSERT_MESSAGE)
                .map_err(|source| StoreError::sqlite("preparing message insert", source))?;
            for message in conversation.messages() {
                insert
                    .execute(params![
                        conversation.id(),
                        message.role().as_str(),
                        message.content(),
                        format_timestamp(message.timestamp()),
                    ])
                    .map_err(|source| StoreError::sqlite("inserting message", source))?;
            }
        }

        transaction
            .commit()
            .map_err(|source| StoreError::sqlite("committing save", source))?;
        debug!(
            conversation_id = conversation.id(),
            messages = conversation.messages().len(),
            "conversation saved"
        );
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Conversation>, StoreError> {
        let rows = {
            let mut statement = self
                .connection
                .prepare(SELECT_CONVERSATIONS)
                .map_err(|source| StoreError::sqlite("preparing conversation query", source))?;
            let mapped = statement
                .query_map([], |row| {
                    Ok(ConversationRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        created_at: row.get(2)?,
                        updated_at: row.get(3)?,
                    })
                })
                .map_err(|source| StoreError::sqlite("loading conversations", source))?;
            mapped
                .collect::<Result<Vec<_>, _>>()
                .map_err(|source| StoreError::sqlite("reading conversation row", source))?
        };

        let mut conversations = Vec::with_capacity(rows.len());
        for row in rows {
            let Some(id) = row.id.filter(|id| !id.trim().is_empty()) else {
                warn!("skipping stored conversation without an id");
                continue;
            };
            let created_at = parse_timestamp("conversations.created_at", &row.created_at)?;
            let updated_at = parse_timestamp("conversations.updated_at", &row.updated_at)?;
            let messages = self.load_messages(&id)?;
            conversations.push(Conversation::from_parts(
                id, row.name, created_at, updated_at, messages,
            ));
        }
        Ok(conversations)
    }

    fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let transaction = self
            .connection
            .transaction()
            .map_err(|source| StoreError::sqlite("starting delete", source))?;
        transaction
            .execute(DELETE_MESSAGES, params![id])
            .map_err(|source| StoreError::sqlite("deleting messages", source))?;
        let removed = transaction
            .execute(DELETE_CONVERSATION, params![id])
            .map_err(|source| StoreError::sqlite("deleting conversation", source))?;
        transaction
            .commit()
            .map_err(|source| StoreError::sqlite("committing delete", source))?;
        debug!(conversation_id = id, removed, "conversation deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::OptionalExtension;
    use time::macros::datetime;

    use super::*;

    fn conversation_exists(store: &SqliteConversationStore, id: &str) -> bool {
        store
            .connection
            .query_row(
                "SELECT 1 FROM conversations WHERE id = ?1",
                params![id],
                |_| Ok(()),
            )
            .optional()
            .expect("query conversation")
            .is_some()
    }

    fn conversation_with(id: &str, texts: &[&str]) -> Conversation {
        let mut conversation =
            Conversation::new(id, "New Chat", datetime!(2024-05-01 10:00:00 UTC));
        for (index, text) in texts.iter().enumerate() {
            let role = if index % 2 == 0 {
                Role::User
            } else {
                Role::Assistant
            };
            conversation.push_message(Message::new(
                role,
                *text,
                datetime!(2024-05-01 10:00:00 UTC) + time::Duration::seconds(index as i64),
            ));
        }
        conversation
    }

    #[test]
    fn save_rejects_blank_ids() {
        let mut store = SqliteConversationStore::open_in_memory().expect("store");
        let error = store
            .save(&Conversation::new(" ", "x", datetime!(2024-05-01 10:00:00 UTC)))
            .expect_err("blank id");
        assert!(matches!(error, StoreError::EmptyConversationId));
    }

    #[test]
    fn delete_removes_conversation_row() {
        let mut store = SqliteConversationStore::open_in_memory().expect("store");
        store
            .save(&conversation_with("c1", &["hi", "hello"]))
            .expect("save");
        assert!(conversation_exists(&store, "c1"));

        store.delete("c1").expect("delete");
        assert!(!conversation_exists(&store, "c1"));
        store.delete("c1").expect("second delete is a no-op");
    }
}
